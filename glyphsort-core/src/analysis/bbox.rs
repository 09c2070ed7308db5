use glam::IVec2;
use serde::Serialize;

/// Flips a y coordinate between a bottom-left origin and a top-left origin.
///
/// Box files count rows from the bottom edge of the page while decoded images
/// count from the top edge. The transform is its own inverse for a fixed
/// `image_height`. Returns `None` when the result does not fit in an `i32`.
///
/// # Example
/// ```
/// use glyphsort_core::analysis::bbox::flip_y;
/// assert_eq!(flip_y(3000, 200), Some(2800));
/// assert_eq!(flip_y(3000, 2800), Some(200));
/// assert_eq!(flip_y(3000, i32::MIN), None);
/// ```
pub fn flip_y(image_height: i32, y: i32) -> Option<i32> {
    image_height.checked_sub(y)
}

/// Glyph rectangle in image coordinates (origin top-left, y growing downward).
///
/// `min` is the top-left corner `(x1, y2)` and `max` the bottom-right corner
/// `(x2, y1)`, with `y1`/`y2` already converted from the box file convention.
/// The corners are kept exactly as converted, so a degenerate row stays
/// visible as an empty rectangle instead of being silently reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Bbox {
    /// Top-left corner.
    pub min: IVec2,
    /// Bottom-right corner.
    pub max: IVec2,
}

impl Bbox {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    /// Builds the image-space rectangle from raw box file coordinates.
    ///
    /// # Arguments
    /// * `x1`, `x2` - Left and right edges, identical in both conventions
    /// * `y1`, `y2` - Bottom and top edges counted from the bottom of the page
    /// * `image_height` - Pixel height of the page image
    ///
    /// Returns `None` when a converted y coordinate overflows.
    ///
    /// # Example
    /// ```
    /// use glam::IVec2;
    /// use glyphsort_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_box_coords(100, 200, 150, 250, 3000).unwrap();
    /// assert_eq!(bbox.min, IVec2::new(100, 2750));
    /// assert_eq!(bbox.max, IVec2::new(150, 2800));
    /// ```
    pub fn from_box_coords(x1: i32, y1: i32, x2: i32, y2: i32, image_height: i32) -> Option<Self> {
        let y1 = flip_y(image_height, y1)?;
        let y2 = flip_y(image_height, y2)?;

        Some(Self::new(IVec2::new(x1, y2), IVec2::new(x2, y1)))
    }

    pub fn left(&self) -> i32 {
        self.min.x
    }

    pub fn top(&self) -> i32 {
        self.min.y
    }

    pub fn right(&self) -> i32 {
        self.max.x
    }

    pub fn bottom(&self) -> i32 {
        self.max.y
    }

    // i64 so that corners at opposite ends of the i32 range still subtract
    pub fn width(&self) -> i64 {
        i64::from(self.max.x) - i64::from(self.min.x)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.max.y) - i64::from(self.min.y)
    }

    /// True when the rectangle has no positive area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// True when the whole rectangle lies inside an image of the given size.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        let bounds = IVec2::new(
            i32::try_from(image_width).unwrap_or(i32::MAX),
            i32::try_from(image_height).unwrap_or(i32::MAX),
        );

        self.min.cmpge(IVec2::ZERO).all() && self.max.cmple(bounds).all()
    }

    /// Crop parameters `(x, y, width, height)` for an image of the given size.
    ///
    /// Returns `None` when the rectangle is empty or reaches outside the image;
    /// nothing is clamped.
    pub fn crop_rect(&self, image_width: u32, image_height: u32) -> Option<(u32, u32, u32, u32)> {
        if self.is_empty() || !self.fits_within(image_width, image_height) {
            return None;
        }

        Some((
            self.min.x as u32,
            self.min.y as u32,
            self.width() as u32,
            self.height() as u32,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x1: i32, y1: i32, x2: i32, y2: i32, image_height: i32) -> Bbox {
        Bbox::from_box_coords(x1, y1, x2, y2, image_height).expect("representable coordinates")
    }

    #[test]
    fn test_flip_y_round_trip() {
        for height in [1, 100, 3000, 4961] {
            for y in [0, 1, 57, height] {
                let flipped = flip_y(height, y);
                assert_eq!(flipped, Some(height - y));
                assert_eq!(flipped.and_then(|f| flip_y(height, f)), Some(y));
            }
        }
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(flip_y(40, i32::MIN), None);
        assert_eq!(flip_y(-2, i32::MAX), None);
        assert_eq!(flip_y(0, i32::MAX), Some(-i32::MAX));

        // `A 1 -2147483648 5 5` on a 40 pixel page
        assert_eq!(Bbox::from_box_coords(1, i32::MIN, 5, 5, 40), None);
        assert_eq!(Bbox::from_box_coords(1, 1, 5, i32::MIN, 40), None);

        // representable corners at both ends of the range
        let huge = Bbox::from_box_coords(i32::MIN, 0, i32::MAX, 10, 10)
            .ok_or("corners should be representable")?;
        assert_eq!(huge.width(), i64::from(i32::MAX) - i64::from(i32::MIN));
        assert!(!huge.is_empty());
        assert_eq!(huge.crop_rect(40, 40), None);

        let inverted = Bbox::from_box_coords(i32::MAX, 0, i32::MIN, 0, 0)
            .ok_or("corners should be representable")?;
        assert!(inverted.is_empty());
        assert_eq!(inverted.crop_rect(40, 40), None);

        let tall = Bbox::from_box_coords(1, 0, 5, i32::MAX, 0)
            .ok_or("corners should be representable")?;
        assert_eq!(tall.height(), i64::from(i32::MAX));
        assert_eq!(tall.crop_rect(40, 40), None);
        Ok(())
    }

    #[test]
    fn test_from_box_coords_reference_row() {
        // `A 100 200 150 250` on a page 3000 pixels tall
        let bbox = rect(100, 200, 150, 250, 3000);

        assert_eq!(bbox.left(), 100);
        assert_eq!(bbox.bottom(), 2800);
        assert_eq!(bbox.right(), 150);
        assert_eq!(bbox.top(), 2750);
        assert_eq!(bbox.width(), 50);
        assert_eq!(bbox.height(), 50);
        assert!(!bbox.is_empty());
    }

    #[test]
    fn test_degenerate_rows_are_empty() {
        // x2 < x1
        assert!(rect(150, 200, 100, 250, 3000).is_empty());
        // top above bottom in box coordinates is swapped
        assert!(rect(100, 250, 150, 200, 3000).is_empty());
        // zero width
        assert!(rect(100, 200, 100, 250, 3000).is_empty());
    }

    #[test]
    fn test_crop_rect_bounds() {
        let inside = rect(10, 10, 20, 30, 100);
        assert_eq!(inside.crop_rect(100, 100), Some((10, 70, 10, 20)));

        // touching the image edges is still inside
        let full = rect(0, 0, 100, 100, 100);
        assert_eq!(full.crop_rect(100, 100), Some((0, 0, 100, 100)));

        // right edge beyond the image width
        let wide = rect(90, 10, 120, 30, 100);
        assert_eq!(wide.crop_rect(100, 100), None);

        // top above the image once the box file value exceeds the height
        let tall = rect(10, 10, 20, 130, 100);
        assert!(tall.top() < 0);
        assert_eq!(tall.crop_rect(100, 100), None);

        let empty = rect(20, 10, 10, 30, 100);
        assert_eq!(empty.crop_rect(100, 100), None);
    }
}
