//! Collision-free URIs for buffers and images written next to the asset

use std::collections::{BTreeSet, HashMap};

use gltfkit_model::ImageModel;
use image::ImageFormat;

/// Hands out `stem{n}.ext` URIs that no element of the model uses yet
#[derive(Debug, Default, Clone)]
pub struct UriGenerator {
    taken: BTreeSet<String>,
    counters: HashMap<String, usize>,
}

impl UriGenerator {
    /// Create a generator that avoids every URI in `taken`
    pub fn new(taken: impl IntoIterator<Item = String>) -> Self {
        Self {
            taken: taken.into_iter().collect(),
            counters: HashMap::new(),
        }
    }

    pub fn generate(&mut self, stem: &str, extension: &str) -> String {
        let counter = self.counters.entry(format!("{}.{}", stem, extension)).or_insert(0);
        loop {
            let candidate = format!("{}{}.{}", stem, counter, extension);
            *counter += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    pub fn buffer_uri(&mut self) -> String {
        self.generate("buffer", "bin")
    }

    pub fn image_uri(&mut self, image: &ImageModel) -> String {
        self.generate("image", image_extension(image))
    }

    pub fn is_taken(&self, uri: &str) -> bool {
        self.taken.contains(uri)
    }
}

/// Format of an image, from its MIME type or else its leading bytes
pub fn image_format(image: &ImageModel) -> Option<ImageFormat> {
    image
        .mime_type
        .as_deref()
        .and_then(ImageFormat::from_mime_type)
        .or_else(|| image::guess_format(&image.data).ok())
}

/// File extension for an image, `png` when the format is unknown
pub fn image_extension(image: &ImageModel) -> &'static str {
    image_format(image)
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("png")
}

/// MIME type for an image, `image/png` when the format is unknown
pub fn image_mime_type(image: &ImageModel) -> &'static str {
    image_format(image)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/png")
}
