use crate::AssetError;
use dicefield_geometry::{IndexedFaceSet, VertexRef};
use std::path::Path;

/// Read and parse a Wavefront OBJ file.
pub fn load_obj(path: impl AsRef<Path>) -> Result<IndexedFaceSet, AssetError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let set = parse_obj(&text)?;
    tracing::debug!(
        path = %path.as_ref().display(),
        positions = set.positions.len(),
        faces = set.faces.len(),
        "loaded obj"
    );
    Ok(set)
}

/// Parse OBJ text into indexed face data.
///
/// Handles the `v`, `vn`, `vt` and `f` records; everything else (including
/// `mtllib`/`usemtl`) is skipped. Face corners must be full `v/vt/vn`
/// triples. Indices are kept 1-based as written.
pub fn parse_obj(text: &str) -> Result<IndexedFaceSet, AssetError> {
    let mut set = IndexedFaceSet::default();

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut terms = line.split_whitespace();
        let record = terms.next().unwrap_or("");
        let terms: Vec<&str> = terms.collect();
        let err = |message: String| AssetError::ObjParse {
            line: line_no + 1,
            message,
        };

        match record {
            "v" => set.positions.push(parse_floats::<3>(&terms).map_err(err)?),
            "vn" => set.normals.push(parse_floats::<3>(&terms).map_err(err)?),
            // vt may carry a third (w) component; only u and v are kept.
            "vt" => set.uvs.push(parse_floats::<2>(&terms).map_err(err)?),
            "f" => {
                let mut face = Vec::with_capacity(terms.len());
                for corner in &terms {
                    face.push(parse_corner(corner).map_err(err)?);
                }
                if face.len() < 3 {
                    return Err(err(format!("face with {} corners", face.len())));
                }
                set.faces.push(face);
            }
            _ => {}
        }
    }
    Ok(set)
}

fn parse_floats<const N: usize>(terms: &[&str]) -> Result<[f32; N], String> {
    if terms.len() < N {
        return Err(format!("expected {N} components, got {}", terms.len()));
    }
    let mut out = [0.0; N];
    for (slot, term) in out.iter_mut().zip(terms) {
        *slot = term
            .parse::<f32>()
            .map_err(|_| format!("invalid number {term:?}"))?;
    }
    Ok(out)
}

fn parse_corner(term: &str) -> Result<VertexRef, String> {
    let parts: Vec<&str> = term.split('/').collect();
    if parts.len() != 3 {
        return Err(format!("expected v/vt/vn triple, got {term:?}"));
    }
    let index = |s: &str| {
        s.parse::<u32>()
            .map_err(|_| format!("invalid index {s:?} in {term:?}"))
    };
    Ok(VertexRef {
        position: index(parts[0])?,
        uv: index(parts[1])?,
        normal: index(parts[2])?,
    })
}
