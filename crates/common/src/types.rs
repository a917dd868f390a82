/// Stable handle for a mesh registered in a scene.
///
/// Assigned at scene insertion and never reused within a scene. The renderer
/// keys its GPU resource cache by this handle, not by object identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

/// Stable handle for a light registered in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub u64);

/// One of the six discrete instance orientations.
///
/// The numeric codes index the fixed model-matrix array in the vertex shader,
/// so the order here must stay in sync with it: top, bottom, south, north,
/// east, west.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Face {
    Top = 0,
    Bottom = 1,
    South = 2,
    North = 3,
    East = 4,
    West = 5,
}

impl Face {
    /// The numeric rotation code stored in instance buffers.
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl Default for Face {
    fn default() -> Self {
        Face::South
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid face code: {0} (expected 0..=5)")]
pub struct FaceCodeError(pub u32);

impl TryFrom<u32> for Face {
    type Error = FaceCodeError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Face::Top),
            1 => Ok(Face::Bottom),
            2 => Ok(Face::South),
            3 => Ok(Face::North),
            4 => Ok(Face::East),
            5 => Ok(Face::West),
            other => Err(FaceCodeError(other)),
        }
    }
}

/// A decoded image: tightly packed RGBA8 pixels plus dimensions.
///
/// This is the renderer-facing image contract. Decoding file formats into it
/// is the asset crate's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureImage {
    /// Wrap an RGBA8 pixel buffer. `pixels` must hold exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A single-color image, useful for tests and placeholder textures.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A two-color checkerboard with cells of `cell` pixels.
    pub fn checkerboard(width: u32, height: u32, cell: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let color = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
                pixels.extend_from_slice(&color);
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
