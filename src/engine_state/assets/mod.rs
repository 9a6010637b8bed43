//! # Asset Loading
//!
//! Builds the process-wide [`TextureTable`] from an asset directory tree:
//!
//! * every `*.png` file becomes a plain texture named after its file stem
//!   (`assets/blocks/stone.png` -> `stone`);
//! * every directory holding an `atlas.png` is a connected-texture family named after the
//!   directory (`assets/blocks/lake/atlas.png` -> `lake`). Its 16 tiles are registered under
//!   `(lake, sides)` and its "no neighbors" tile is also registered as the plain texture `lake`;
//! * the `font` texture must exist.
//!
//! Loading happens once at startup, sequentially, and fails fast. After that the table is
//! only ever read.

use std::{
    cell::Cell,
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use image::RgbaImage;
use log::{debug, info, warn};
use thiserror::Error;

use super::rendering::{
    atlas::{self, AtlasError, ConnectedSides},
    TextureRef,
};

/// File name of the atlas image inside a connected-texture family directory.
pub const ATLAS_FILE_NAME: &str = "atlas.png";
/// Name of the texture that must be present for the engine to start.
pub const FONT_TEXTURE: &str = "font";

/// Errors raised while loading assets. All of them abort startup.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("connected texture family `{family}` has a malformed atlas: {source}")]
    MalformedAtlas {
        family: String,
        #[source]
        source: AtlasError,
    },

    #[error("cannot find the font texture")]
    MissingFont,
}

/// All decoded textures, keyed by name and by (family, connected sides).
pub struct TextureTable {
    textures: HashMap<String, TextureRef>,
    connected: HashMap<(String, ConnectedSides), TextureRef>,
    font: TextureRef,
    placeholder: TextureRef,
    missing_lookups: Cell<usize>,
}

impl TextureTable {
    /// Creates a table holding only the font texture.
    pub fn new(font: TextureRef) -> Self {
        let mut textures = HashMap::new();
        textures.insert(FONT_TEXTURE.to_string(), font.clone());

        Self {
            textures,
            connected: HashMap::new(),
            font,
            placeholder: TextureRef::placeholder(),
            missing_lookups: Cell::new(0),
        }
    }

    /// Walks `dir` recursively and loads every texture and connected family in it.
    ///
    /// # Errors
    /// * [`AssetError::Io`] / [`AssetError::Decode`] if a file cannot be read or decoded
    /// * [`AssetError::MalformedAtlas`] if a family's `atlas.png` is not a 4x4 grid of 16x16 tiles
    /// * [`AssetError::MissingFont`] if no `font.png` was found
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        let mut textures = HashMap::new();
        let mut families = Vec::new();

        visit_directory(dir, &mut textures, &mut families)?;

        let font = textures
            .get(FONT_TEXTURE)
            .cloned()
            .ok_or(AssetError::MissingFont)?;

        let mut table = TextureTable::new(font);
        for (name, texture) in textures {
            table.insert_texture(name, texture);
        }
        for (family, atlas_image) in families {
            table
                .insert_family(&family, &atlas_image)
                .map_err(|source| AssetError::MalformedAtlas {
                    family: family.clone(),
                    source,
                })?;
        }

        info!(
            "Loaded {} textures and {} connected texture families from {}",
            table.textures.len(),
            table.connected.len() / 16,
            dir.display()
        );

        Ok(table)
    }

    /// Registers a plain texture, replacing any texture with the same name.
    pub fn insert_texture(&mut self, name: impl Into<String>, texture: TextureRef) {
        self.textures.insert(name.into(), texture);
    }

    /// Slices `atlas_image` and registers its 16 tiles under `family`, plus the plain
    /// "no neighbors" tile under the bare family name.
    pub fn insert_family(
        &mut self,
        family: &str,
        atlas_image: &RgbaImage,
    ) -> Result<(), AtlasError> {
        let sliced = atlas::slice_atlas(atlas_image)?;
        for (sides, texture) in sliced.tiles {
            self.connected.insert((family.to_string(), sides), texture);
        }
        self.textures.insert(family.to_string(), sliced.plain);
        Ok(())
    }

    /// Looks up a plain texture.
    pub fn get(&self, name: &str) -> Option<&TextureRef> {
        self.textures.get(name)
    }

    /// Looks up a tile of a connected family.
    pub fn get_connected(&self, family: &str, sides: ConnectedSides) -> Option<&TextureRef> {
        self.connected.get(&(family.to_string(), sides))
    }

    /// Returns the plain texture `name`, or the placeholder if it was never loaded.
    pub fn texture(&self, name: &str) -> TextureRef {
        match self.get(name) {
            Some(texture) => texture.clone(),
            None => self.missing(name),
        }
    }

    /// Returns the tile of `family` for `sides`, or the placeholder if the family was never loaded.
    pub fn connected_texture(&self, family: &str, sides: ConnectedSides) -> TextureRef {
        match self.get_connected(family, sides) {
            Some(texture) => texture.clone(),
            None => self.missing(family),
        }
    }

    pub fn font(&self) -> &TextureRef {
        &self.font
    }

    /// Number of lookups that fell back to the placeholder so far.
    pub fn missing_lookups(&self) -> usize {
        self.missing_lookups.get()
    }

    fn missing(&self, name: &str) -> TextureRef {
        if self.missing_lookups.get() == 0 {
            warn!("Texture `{}` is not loaded, drawing the placeholder instead", name);
        } else {
            debug!("Texture `{}` is not loaded", name);
        }
        self.missing_lookups.set(self.missing_lookups.get() + 1);
        self.placeholder.clone()
    }
}

/// Removes the extension and the parent directories from a path.
/// Example: `assets/pictures/picture.png` -> `picture`
fn clean_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_image(path: &Path) -> Result<RgbaImage, AssetError> {
    let image = image::open(path).map_err(|source| match source {
        image::ImageError::IoError(source) => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => AssetError::Decode {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(image.to_rgba8())
}

fn visit_directory(
    dir: &Path,
    textures: &mut HashMap<String, TextureRef>,
    families: &mut Vec<(String, RgbaImage)>,
) -> Result<(), AssetError> {
    let io_error = |source| AssetError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort();

    let atlas_path = dir.join(ATLAS_FILE_NAME);
    let has_subdirectories = entries.iter().any(|path| path.is_dir());

    if atlas_path.is_file() {
        families.push((clean_name(dir), read_image(&atlas_path)?));
    } else if !has_subdirectories {
        warn!(
            "Skipping {}: no {} found, the family has no connected textures",
            dir.display(),
            ATLAS_FILE_NAME
        );
    }

    for path in entries {
        if path.is_dir() {
            visit_directory(&path, textures, families)?;
        } else if path == atlas_path {
            continue;
        } else if path.extension().is_some_and(|ext| ext == "png") {
            textures.insert(clean_name(&path), TextureRef::new(read_image(&path)?));
        }
    }

    Ok(())
}

/// An in-memory table with a font and the `lake` and `path` families, for tests.
#[cfg(test)]
pub(crate) fn test_textures() -> TextureTable {
    use image::Rgba;

    let mut table = TextureTable::new(TextureRef::new(RgbaImage::new(16, 16)));
    for name in ["grass", "sand", "stone", "cave", "player"] {
        let image = RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 255]));
        table.insert_texture(name, TextureRef::new(image));
    }
    for family in ["lake", "path"] {
        let atlas_image =
            RgbaImage::from_fn(64, 64, |x, y| Rgba([(x / 16) as u8, (y / 16) as u8, 7, 255]));
        table
            .insert_family(family, &atlas_image)
            .expect("test atlas is well formed");
    }
    table
}

#[cfg(test)]
mod tests {
    use image::Rgba;
    use tempfile::tempdir;

    use super::*;

    fn write_png(path: &Path, size: u32) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbaImage::from_fn(size, size, |x, y| Rgba([(x / 16) as u8, (y / 16) as u8, 0, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn loads_textures_and_families() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("font.png"), 16);
        write_png(&dir.path().join("blocks/stone.png"), 16);
        write_png(&dir.path().join("blocks/lake/atlas.png"), 64);

        let table = TextureTable::load(dir.path()).unwrap();

        assert!(table.get("font").is_some());
        assert!(table.get("stone").is_some());
        assert!(table.get("lake").is_some());
        assert!(table.get("atlas").is_none());
        for sides in ConnectedSides::all() {
            let tile = table.get_connected("lake", sides).unwrap();
            let coordinate = sides.atlas_coordinate();
            assert_eq!(
                *tile.image().get_pixel(8, 8),
                Rgba([coordinate.col as u8, coordinate.row as u8, 0, 255])
            );
        }
    }

    #[test]
    fn family_without_atlas_is_skipped() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("font.png"), 16);
        fs::create_dir_all(dir.path().join("blocks/empty_family")).unwrap();

        let table = TextureTable::load(dir.path()).unwrap();
        assert!(table.get("empty_family").is_none());
        assert!(table.get_connected("empty_family", ConnectedSides::NONE).is_none());
    }

    #[test]
    fn malformed_atlas_fails_loudly() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("font.png"), 16);
        write_png(&dir.path().join("blocks/lake/atlas.png"), 48);

        match TextureTable::load(dir.path()) {
            Err(AssetError::MalformedAtlas { family, source }) => {
                assert_eq!(family, "lake");
                assert_eq!(
                    source,
                    AtlasError::InvalidDimensions {
                        width: 48,
                        height: 48,
                        expected: 64
                    }
                );
            }
            other => panic!("expected a malformed atlas error, got {:?}", other.err()),
        }
    }

    #[test]
    fn missing_font_is_fatal() {
        let dir = tempdir().unwrap();
        write_png(&dir.path().join("stone.png"), 16);

        assert!(matches!(TextureTable::load(dir.path()), Err(AssetError::MissingFont)));
    }

    #[test]
    fn unknown_names_fall_back_to_the_placeholder() {
        let table = test_textures();
        let texture = table.texture("does-not-exist");
        assert!(texture.ptr_eq(&table.texture("also-missing")));
        assert_eq!(table.missing_lookups(), 2);

        let tile = table.connected_texture("lake", ConnectedSides::new(true, true, true, true));
        assert_eq!(*tile.image().get_pixel(0, 0), Rgba([2, 2, 7, 255]));
        assert_eq!(table.missing_lookups(), 2);
    }
}
