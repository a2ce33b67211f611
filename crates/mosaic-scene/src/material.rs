use mosaic_core::Color;
use serde::{Deserialize, Serialize};

/// Well-known material property keys.
pub mod keys {
    pub const COLOR_DIFFUSE: &str = "$clr.diffuse";
    pub const COLOR_AMBIENT: &str = "$clr.ambient";
    pub const COLOR_SPECULAR: &str = "$clr.specular";
    pub const COLOR_EMISSIVE: &str = "$clr.emissive";
    pub const OPACITY: &str = "$mat.opacity";
    pub const SHININESS: &str = "$mat.shininess";
    pub const TWO_SIDED: &str = "$mat.twosided";
    pub const SHADING_MODEL: &str = "$mat.shadingm";
    pub const TEXTURE: &str = "$tex.file";
}

/// Name given to materials that importers synthesize for material-less meshes.
pub const DEFAULT_MATERIAL_NAME: &str = "DefaultMaterial";

/// Semantic slot a texture is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Ambient,
    Emissive,
    Height,
    Normals,
    Shininess,
    Opacity,
    Displacement,
    Lightmap,
    Reflection,
    Unknown,
}

/// Reference to a texture image; decoding is left to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureRef {
    pub kind: TextureKind,
    pub path: String,
    /// Texture coordinate channel the texture is mapped with.
    pub uv_channel: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Color(Color),
    Float(f32),
    Int(i32),
    String(String),
    Texture(TextureRef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperty {
    pub key: String,
    pub value: PropertyValue,
}

/// A named, unordered set of typed properties.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    properties: Vec<MaterialProperty>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Material used when an importer has none to offer.
    pub fn default_material() -> Self {
        let mut material = Self::new(DEFAULT_MATERIAL_NAME);
        material.set(keys::COLOR_DIFFUSE, PropertyValue::Color(Color::rgb(0.6, 0.6, 0.6)));
        material
    }

    /// Insert or replace the property stored under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: PropertyValue) {
        let key = key.into();
        match self.properties.iter_mut().find(|p| p.key == key) {
            Some(existing) => existing.value = value,
            None => self.properties.push(MaterialProperty { key, value }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| &p.value)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        let pos = self.properties.iter().position(|p| p.key == key)?;
        Some(self.properties.swap_remove(pos).value)
    }

    pub fn color(&self, key: &str) -> Option<Color> {
        match self.get(key)? {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn float(&self, key: &str) -> Option<f32> {
        match self.get(key)? {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// Attach a texture. Textures are stored under `$tex.file.<kind>.<n>`.
    pub fn add_texture(&mut self, texture: TextureRef) {
        let n = self.texture_count(texture.kind);
        let key = format!("{}.{:?}.{}", keys::TEXTURE, texture.kind, n);
        self.set(key, PropertyValue::Texture(texture));
    }

    /// All textures bound to the given slot.
    pub fn textures(&self, kind: TextureKind) -> impl Iterator<Item = &TextureRef> {
        self.properties.iter().filter_map(move |p| match &p.value {
            PropertyValue::Texture(t) if t.kind == kind => Some(t),
            _ => None,
        })
    }

    pub fn texture_count(&self, kind: TextureKind) -> usize {
        self.textures(kind).count()
    }

    pub fn properties(&self) -> &[MaterialProperty] {
        &self.properties
    }
}
