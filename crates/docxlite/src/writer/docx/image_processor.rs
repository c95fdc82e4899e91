//! Image payload resolution and processing for DOCX output.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Cursor;

use base64::Engine;
use docx_rs::Pic;
use log::warn;

use crate::ir::{Block, DocumentModel, ImageBlock};

/// EMUs per pixel at 96 dpi.
const EMU_PER_PIXEL: u32 = 9525;

/// Default width in pixels when the markup declares none.
const DEFAULT_WIDTH: u32 = 480;

/// Materializes image bytes and turns them into serializer pictures.
#[derive(Debug, Default)]
pub struct DocxImageProcessor {
    client: reqwest::Client,
}

impl DocxImageProcessor {
    /// Create a new image processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves an image source to its raw bytes.
    ///
    /// Inline-encoded sources decode in place and never touch the network.
    /// Every failure mode answers `None`: the affected image block is omitted
    /// from the output while the rest of the document exports.
    pub async fn resolve(&self, source: &str) -> Option<Vec<u8>> {
        if source.is_empty() {
            return None;
        }
        if source.starts_with("data:") {
            return decode_data_url(source);
        }
        match self.client.get(source).send().await {
            Ok(response) if response.status().is_success() => {
                response.bytes().await.ok().map(|bytes| bytes.to_vec())
            }
            Ok(response) => {
                warn!("image fetch returned {} for {source}", response.status());
                None
            }
            Err(err) => {
                warn!("image fetch failed for {source}: {err}");
                None
            }
        }
    }

    /// Converts resolved bytes into a sized picture.
    ///
    /// The serializer understands PNG and JPEG; other decodable formats are
    /// re-encoded to PNG. Undecodable payloads answer `None`.
    pub fn to_pic(&self, data: &[u8], block: &ImageBlock) -> Option<Pic> {
        let format = match image::guess_format(data) {
            Ok(format) => format,
            Err(err) => {
                warn!("unknown image format for {}: {err}", block.source);
                return None;
            }
        };

        let payload: Cow<'_, [u8]> = match format {
            image::ImageFormat::Png | image::ImageFormat::Jpeg => Cow::Borrowed(data),
            _ => {
                let decoded = match image::load_from_memory(data) {
                    Ok(decoded) => decoded,
                    Err(err) => {
                        warn!("cannot decode image {}: {err}", block.source);
                        return None;
                    }
                };
                let mut buffer = Vec::new();
                if decoded
                    .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
                    .is_err()
                {
                    warn!("cannot re-encode image {}", block.source);
                    return None;
                }
                Cow::Owned(buffer)
            }
        };

        let width = block.width.unwrap_or(DEFAULT_WIDTH);
        let height = block
            .height
            .unwrap_or_else(|| (width as f32 * 0.75).round() as u32);
        Some(Pic::new(&payload).size(width * EMU_PER_PIXEL, height * EMU_PER_PIXEL))
    }
}

fn decode_data_url(source: &str) -> Option<Vec<u8>> {
    let (_, payload) = source.split_once(";base64,")?;
    base64::engine::general_purpose::STANDARD.decode(payload).ok()
}

/// Resolved image bytes keyed by the block's position in the model.
#[derive(Debug, Default)]
pub struct ImagePayloads(HashMap<usize, Vec<u8>>);

impl ImagePayloads {
    /// An empty payload set; every image block will be omitted.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolves all image blocks of a model, one fetch per block, with no
    /// ordering requirement among them.
    pub async fn resolve(processor: &DocxImageProcessor, model: &DocumentModel) -> Self {
        let pending = model.blocks.iter().enumerate().filter_map(|(idx, block)| {
            let Block::Image(image) = block else {
                return None;
            };
            Some(async move { (idx, processor.resolve(image.source.as_str()).await) })
        });
        let resolved = futures::future::join_all(pending).await;
        Self(
            resolved
                .into_iter()
                .filter_map(|(idx, data)| Some((idx, data?)))
                .collect(),
        )
    }

    /// Bytes for the image block at the given model position.
    pub fn get(&self, block_index: usize) -> Option<&[u8]> {
        self.0.get(&block_index).map(Vec::as_slice)
    }

    /// Number of successfully resolved payloads.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no payload resolved.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A valid 1x1 transparent PNG.
    const PNG_1X1: &str = concat!(
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk",
        "YPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==",
    );

    #[tokio::test]
    async fn inline_sources_decode_without_network() {
        let processor = DocxImageProcessor::new();
        let source = format!("data:image/png;base64,{PNG_1X1}");
        let data = processor.resolve(&source).await.unwrap();
        assert_eq!(image::guess_format(&data).unwrap(), image::ImageFormat::Png);
    }

    #[tokio::test]
    async fn malformed_inline_encoding_is_omitted() {
        let processor = DocxImageProcessor::new();
        assert!(processor.resolve("data:image/png;base64,!!!").await.is_none());
        assert!(processor.resolve("data:image/png,plain").await.is_none());
    }

    #[tokio::test]
    async fn unreachable_remote_source_is_omitted() {
        let processor = DocxImageProcessor::new();
        let data = processor.resolve("http://127.0.0.1:9/missing.png").await;
        assert!(data.is_none());
    }

    #[test]
    fn explicit_dimensions_override_defaults() {
        let processor = DocxImageProcessor::new();
        let data = base64::engine::general_purpose::STANDARD
            .decode(PNG_1X1)
            .unwrap();
        let block = ImageBlock {
            width: Some(100),
            height: Some(50),
            ..Default::default()
        };
        assert!(processor.to_pic(&data, &block).is_some());
    }

    #[test]
    fn undecodable_payload_is_omitted() {
        let processor = DocxImageProcessor::new();
        let block = ImageBlock::default();
        assert!(processor.to_pic(b"not an image", &block).is_none());
    }
}
