/// Image-to-screen coordinate mapping used for the pose translation

/// Maps face-space x/y (image pixels) into screen x/y.
pub trait CoordinateMapping {
    fn map_x(&self, x: f32) -> f32;
    fn map_y(&self, y: f32) -> f32;
}

/// Leaves coordinates untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapping;

impl CoordinateMapping for IdentityMapping {
    fn map_x(&self, x: f32) -> f32 {
        x
    }

    fn map_y(&self, y: f32) -> f32 {
        y
    }
}

/// Center-crop mapping from a camera image into a view, optionally mirrored
/// horizontally for a front-facing camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapping {
    pub scale_factor: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub view_width: f32,
    pub mirrored: bool,
}

impl ScreenMapping {
    /// Scale the image to cover the view, cropping the overflowing axis evenly.
    pub fn fit(image: (f32, f32), view: (f32, f32), mirrored: bool) -> Self {
        let (image_width, image_height) = image;
        let (view_width, view_height) = view;
        let view_aspect = view_width / view_height;
        let image_aspect = image_width / image_height;

        let (scale_factor, offset_x, offset_y) = if view_aspect > image_aspect {
            // Crop vertically
            (
                view_width / image_width,
                0.0,
                (view_width / image_aspect - view_height) / 2.0,
            )
        } else {
            (
                view_height / image_height,
                (view_height * image_aspect - view_width) / 2.0,
                0.0,
            )
        };

        Self {
            scale_factor,
            offset_x,
            offset_y,
            view_width,
            mirrored,
        }
    }
}

impl CoordinateMapping for ScreenMapping {
    fn map_x(&self, x: f32) -> f32 {
        let scaled = x * self.scale_factor - self.offset_x;
        if self.mirrored {
            self.view_width - scaled
        } else {
            scaled
        }
    }

    fn map_y(&self, y: f32) -> f32 {
        y * self.scale_factor - self.offset_y
    }
}
