//! The asynchronous image-decode boundary.
//!
//! Decoding is the only step that may run off the UI thread. Every request
//! carries the widget generation it was issued for, so a completion that
//! arrives after a newer upload can be recognized and dropped.

use image::DynamicImage;

use crate::error::Result;
use crate::model::ImageRecord;
use crate::serialize::{decode_data_url, encode_data_url};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeTicket {
    pub(crate) generation: u64,
}

/// What the widget does once the image is decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeOrigin {
    /// A fresh upload: replaces the image and discards annotations.
    Upload,
    /// Rehydrating a saved session: annotations are kept.
    Restore,
}

#[derive(Clone, Debug)]
pub struct PendingDecode {
    pub ticket: DecodeTicket,
    pub origin: DecodeOrigin,
    pub record: ImageRecord,
}

pub struct DecodedImage {
    pub ticket: DecodeTicket,
    pub origin: DecodeOrigin,
    pub record: ImageRecord,
    pub image: DynamicImage,
}

impl PendingDecode {
    pub(crate) fn upload(generation: u64, name: &str, bytes: &[u8]) -> Self {
        let mime = image::guess_format(bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");
        Self {
            ticket: DecodeTicket { generation },
            origin: DecodeOrigin::Upload,
            record: ImageRecord {
                name: name.to_string(),
                contents: encode_data_url(mime, bytes),
            },
        }
    }

    pub(crate) fn restore(generation: u64, record: ImageRecord) -> Self {
        Self {
            ticket: DecodeTicket { generation },
            origin: DecodeOrigin::Restore,
            record,
        }
    }

    /// Decodes the image bytes. Safe to call from any thread.
    pub fn run(self) -> Result<DecodedImage> {
        let bytes = decode_data_url(&self.record.contents)?;
        let image = image::load_from_memory(&bytes)?;
        log::debug!(
            "decoded {} ({}x{})",
            self.record.name,
            image.width(),
            image.height()
        );
        Ok(DecodedImage {
            ticket: self.ticket,
            origin: self.origin,
            record: self.record,
            image,
        })
    }
}
