use std::collections::HashMap;
use std::fmt;

/// Opaque renderer-side texture id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Opaque renderer-side font id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u32);

/// Opaque audio-side sound id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u32);

/// A named resource could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentError {
    pub name: String,
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "content not found: {}", self.name)
    }
}

impl std::error::Error for ContentError {}

/// Resolves string resource names to handles. The core calls this only
/// during screen `load`; handles are released when their owner drops.
pub trait ContentSource {
    fn texture(&mut self, name: &str) -> Result<TextureHandle, ContentError>;
    fn font(&mut self, name: &str) -> Result<FontHandle, ContentError>;
    fn sound(&mut self, name: &str) -> Result<SoundHandle, ContentError>;
}

/// In-memory content source backed by name maps. Used by tests and the
/// demo binary; a real game supplies its own asset-pipeline implementation.
#[derive(Debug, Default)]
pub struct MapContent {
    textures: HashMap<String, TextureHandle>,
    fonts: HashMap<String, FontHandle>,
    sounds: HashMap<String, SoundHandle>,
    next: u32,
}

impl MapContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture name, returning its handle.
    pub fn add_texture(&mut self, name: &str) -> TextureHandle {
        let handle = TextureHandle(self.next);
        self.next += 1;
        self.textures.insert(name.to_string(), handle);
        handle
    }

    pub fn add_font(&mut self, name: &str) -> FontHandle {
        let handle = FontHandle(self.next);
        self.next += 1;
        self.fonts.insert(name.to_string(), handle);
        handle
    }

    pub fn add_sound(&mut self, name: &str) -> SoundHandle {
        let handle = SoundHandle(self.next);
        self.next += 1;
        self.sounds.insert(name.to_string(), handle);
        handle
    }
}

impl ContentSource for MapContent {
    fn texture(&mut self, name: &str) -> Result<TextureHandle, ContentError> {
        self.textures.get(name).copied().ok_or_else(|| ContentError {
            name: name.to_string(),
        })
    }

    fn font(&mut self, name: &str) -> Result<FontHandle, ContentError> {
        self.fonts.get(name).copied().ok_or_else(|| ContentError {
            name: name.to_string(),
        })
    }

    fn sound(&mut self, name: &str) -> Result<SoundHandle, ContentError> {
        self.sounds.get(name).copied().ok_or_else(|| ContentError {
            name: name.to_string(),
        })
    }
}
