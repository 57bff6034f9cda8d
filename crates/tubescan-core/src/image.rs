use crate::detection::ImageInfo;
use crate::region::Region;

/// Borrowed 8-bit grayscale raster.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8], // row-major, len = w*h
}

impl<'a> GrayImageView<'a> {
    /// Wrap `data`, returning `None` unless it holds exactly `width * height`
    /// pixels.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize)?;
        (data.len() == expected).then_some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Region covering the whole image.
    pub fn bounds(&self) -> Region {
        Region::full(self.width, self.height)
    }

    /// Geometry of this image scanned at `dpi`.
    pub fn info(&self, dpi: u32) -> ImageInfo {
        ImageInfo {
            width: self.width,
            height: self.height,
            dpi,
        }
    }

    /// Iterate the rows of `region`, clipped to the image.
    pub fn rows_in(&self, region: Region) -> impl Iterator<Item = &'a [u8]> + 'a {
        let w = self.width as usize;
        let x0 = (region.x as usize).min(w);
        let x1 = (region.x as usize + region.width as usize).min(w);
        let y0 = (region.y as usize).min(self.height as usize);
        let y1 = (region.y as usize + region.height as usize).min(self.height as usize);
        let data = self.data;
        (y0..y1).map(move |y| &data[y * w + x0..y * w + x1])
    }
}
