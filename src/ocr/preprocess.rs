//! 画像前処理 - 手書き文字をOCRしやすい二値画像にする

use image::{DynamicImage, GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::close;

/// 前処理パラメータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessConfig {
    /// ノイズ除去のぼかし (5x5 カーネル相当)
    pub blur_sigma: f32,
    /// 適応的二値化の近傍重み (11x11 ブロック相当)
    pub threshold_sigma: f32,
    /// 近傍平均から差し引く定数
    pub threshold_offset: u8,
    /// クロージング半径 (0 で無効)
    pub close_radius: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            threshold_sigma: 2.0,
            threshold_offset: 2,
            close_radius: 1,
        }
    }
}

/// グレースケール → ぼかし → 適応的二値化 → クロージング
pub fn preprocess(image: &DynamicImage, config: &PreprocessConfig) -> GrayImage {
    let gray = image.to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return gray;
    }

    let blurred = if config.blur_sigma > 0.0 {
        gaussian_blur_f32(&gray, config.blur_sigma)
    } else {
        gray
    };

    let binary = adaptive_gaussian_threshold(
        &blurred,
        config.threshold_sigma,
        config.threshold_offset,
    );

    if config.close_radius == 0 {
        binary
    } else {
        close(&binary, Norm::LInf, config.close_radius)
    }
}

/// ガウス重み付き近傍平均 - offset より明るい画素を白にする
fn adaptive_gaussian_threshold(image: &GrayImage, sigma: f32, offset: u8) -> GrayImage {
    let local = if sigma > 0.0 {
        gaussian_blur_f32(image, sigma)
    } else {
        image.clone()
    };
    let offset = i16::from(offset);

    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let pixel = i16::from(image.get_pixel(x, y)[0]);
        let mean = i16::from(local.get_pixel(x, y)[0]);
        if pixel > mean - offset {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// 白地に黒い横線を引いた画像
    fn page_with_stroke() -> DynamicImage {
        let mut img = RgbImage::from_pixel(64, 48, Rgb([240, 240, 235]));
        for x in 10..54 {
            for y in 22..26 {
                img.put_pixel(x, y, Rgb([20, 20, 30]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn output_is_binary_and_keeps_size() {
        let out = preprocess(&page_with_stroke(), &PreprocessConfig::default());
        assert_eq!(out.dimensions(), (64, 48));
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn stroke_becomes_black_on_white() {
        let out = preprocess(&page_with_stroke(), &PreprocessConfig::default());
        // 線の縁は近傍平均より暗い
        assert_eq!(out.get_pixel(32, 22)[0], 0);
        // 線から離れた余白は白
        assert_eq!(out.get_pixel(2, 2)[0], 255);
    }

    #[test]
    fn blank_page_stays_white() {
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(32, 32, Luma([200])));
        let out = preprocess(&blank, &PreprocessConfig::default());
        assert!(out.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn steps_can_be_disabled() {
        let config = PreprocessConfig {
            blur_sigma: 0.0,
            threshold_sigma: 0.0,
            threshold_offset: 0,
            close_radius: 0,
        };
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([90])));
        let out = preprocess(&blank, &config);
        // pixel == mean のため閾値を超えない
        assert!(out.pixels().all(|p| p[0] == 0));
    }
}
