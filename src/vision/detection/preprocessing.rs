// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLOv8

use image::{DynamicImage, GenericImageView};
use ndarray::Array4;

/// Square input size of the stock YOLOv8 exports
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// Smallest accepted input size
///
/// At 64 the stride 8/16/32 grids give 84 anchors, matching the 4 + 80
/// feature rows of a COCO head. Anything smaller yields fewer anchors than
/// features and the output layout can no longer be told apart.
pub const MIN_INPUT_SIZE: u32 = 64;

/// Gray fill used for the letterbox border
pub const PAD_VALUE: u8 = 114;

/// Geometry of a letterbox resize
///
/// Records how an original image was scaled and offset onto the square
/// model input so predictions can be mapped back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Scale factor applied to both axes
    pub scale: f32,
    /// Horizontal padding on the left, in input pixels
    pub pad_x: u32,
    /// Vertical padding on the top, in input pixels
    pub pad_y: u32,
    /// Width of the resized image inside the canvas
    pub resized_width: u32,
    /// Height of the resized image inside the canvas
    pub resized_height: u32,
    pub input_size: u32,
}

impl Letterbox {
    /// Calculate letterbox geometry for an image of the given size
    pub fn new(orig_w: u32, orig_h: u32, input_size: u32) -> Self {
        if orig_w == 0 || orig_h == 0 {
            return Self {
                scale: 1.0,
                pad_x: 0,
                pad_y: 0,
                resized_width: 0,
                resized_height: 0,
                input_size,
            };
        }

        let scale = (input_size as f32 / orig_w as f32).min(input_size as f32 / orig_h as f32);
        let resized_width = ((orig_w as f32 * scale).round() as u32).clamp(1, input_size);
        let resized_height = ((orig_h as f32 * scale).round() as u32).clamp(1, input_size);

        Self {
            scale,
            pad_x: (input_size - resized_width) / 2,
            pad_y: (input_size - resized_height) / 2,
            resized_width,
            resized_height,
            input_size,
        }
    }

    /// Map a coordinate from model input space back to original image space
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.pad_x as f32) / self.scale,
            (y - self.pad_y as f32) / self.scale,
        )
    }
}

/// Preprocess an image for YOLOv8 detection
///
/// Steps:
/// 1. Resize with aspect ratio preservation to fit `input_size`
/// 2. Center on a square canvas padded with gray (114)
/// 3. Scale pixel values to [0, 1]
/// 4. Lay out as an NCHW tensor [1, 3, S, S]
pub fn letterbox(image: &DynamicImage, input_size: u32) -> (Array4<f32>, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();
    let geometry = Letterbox::new(orig_w, orig_h, input_size);

    let size = input_size as usize;
    let mut tensor = Array4::from_elem((1, 3, size, size), PAD_VALUE as f32 / 255.0);

    if geometry.resized_width == 0 || geometry.resized_height == 0 {
        return (tensor, geometry);
    }

    let resized = image
        .resize_exact(
            geometry.resized_width,
            geometry.resized_height,
            image::imageops::FilterType::Triangle,
        )
        .to_rgb8();

    let pad_x = geometry.pad_x as usize;
    let pad_y = geometry.pad_y as usize;
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize + pad_x, y as usize + pad_y);
        for c in 0..3 {
            tensor[[0, c, y, x]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, geometry)
}
