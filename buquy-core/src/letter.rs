/// Parametric letter solids built by extruding cross-section polygons
use std::fmt;

use nalgebra::{Matrix4, Vector3};

use crate::error::MeshError;
use crate::geometry::{Color, Mesh};
use crate::transform::Transform;

/// Share of the letter height used as bar thickness
const BAR_THICKNESS_RATIO: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterKind {
    X,
    K,
    T,
    H,
    V,
}

impl LetterKind {
    pub const ALL: [LetterKind; 5] = [LetterKind::X, LetterKind::K, LetterKind::T, LetterKind::H, LetterKind::V];

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'X' => Some(LetterKind::X),
            'K' => Some(LetterKind::K),
            'T' => Some(LetterKind::T),
            'H' => Some(LetterKind::H),
            'V' => Some(LetterKind::V),
            _ => None,
        }
    }

    fn palette(self) -> Palette {
        match self {
            LetterKind::X | LetterKind::K => Palette::WHITE,
            LetterKind::T | LetterKind::H | LetterKind::V => Palette::ORANGE,
        }
    }
}

impl fmt::Display for LetterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            LetterKind::X => 'X',
            LetterKind::K => 'K',
            LetterKind::T => 'T',
            LetterKind::H => 'H',
            LetterKind::V => 'V',
        };
        write!(f, "{c}")
    }
}

/// Colours for the front/back faces, the side faces and the caps of a part
#[derive(Debug, Clone, Copy)]
struct Palette {
    face: Color,
    side: Color,
    cap: Color,
}

impl Palette {
    const WHITE: Palette = Palette {
        face: Color::WHITE,
        side: Color::WHITE,
        cap: Color::WHITE,
    };
    const ORANGE: Palette = Palette {
        face: Color::rgb(255, 140, 0),
        side: Color::rgb(255, 165, 0),
        cap: Color::rgb(255, 127, 80),
    };
}

/// Dimensions and shape of a letter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterParams {
    pub kind: LetterKind,
    pub height: f32,
    pub width: f32,
    pub depth: f32,
    pub offset_x: f32,
}

impl LetterParams {
    pub fn new(kind: LetterKind, height: f32, width: f32, depth: f32) -> Self {
        Self {
            kind,
            height,
            width,
            depth,
            offset_x: 0.0,
        }
    }

    pub fn with_offset(mut self, offset_x: f32) -> Self {
        self.offset_x = offset_x;
        self
    }

    pub fn with_param(mut self, param: LetterParam) -> Self {
        match param {
            LetterParam::Height(v) => self.height = v,
            LetterParam::Width(v) => self.width = v,
            LetterParam::Depth(v) => self.depth = v,
            LetterParam::OffsetX(v) => self.offset_x = v,
            LetterParam::Kind(kind) => self.kind = kind,
        }
        self
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        for (name, value) in [("height", self.height), ("width", self.width), ("depth", self.depth)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MeshError::InvalidDimension { name, value });
            }
        }
        if !self.offset_x.is_finite() {
            return Err(MeshError::InvalidDimension {
                name: "offset",
                value: self.offset_x,
            });
        }
        Ok(())
    }
}

/// A single parameter change for a letter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LetterParam {
    Height(f32),
    Width(f32),
    Depth(f32),
    OffsetX(f32),
    Kind(LetterKind),
}

/// A letter solid and the parameters it was generated from
#[derive(Debug, Clone)]
pub struct Letter {
    params: LetterParams,
    /// Extra world-space translation applied after the object transform
    pub translation: Vector3<f32>,
    mesh: Mesh,
}

impl Letter {
    pub fn new(params: LetterParams) -> Result<Self, MeshError> {
        Ok(Self {
            mesh: build_mesh(&params)?,
            params,
            translation: Vector3::zeros(),
        })
    }

    pub fn params(&self) -> &LetterParams {
        &self.params
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Replace the parameters and rebuild; on error nothing changes
    pub fn set_params(&mut self, params: LetterParams) -> Result<(), MeshError> {
        let mesh = build_mesh(&params)?;
        self.params = params;
        self.mesh = mesh;
        Ok(())
    }

    pub fn set_param(&mut self, param: LetterParam) -> Result<(), MeshError> {
        self.set_params(self.params.with_param(param))
    }

    /// Regenerate vertices and faces from the current parameters
    pub fn update_geometry(&mut self) -> Result<(), MeshError> {
        self.mesh = build_mesh(&self.params)?;
        Ok(())
    }

    pub fn translation_matrix(&self) -> Matrix4<f32> {
        Transform::translation(self.translation.x, self.translation.y, self.translation.z)
    }
}

fn build_mesh(params: &LetterParams) -> Result<Mesh, MeshError> {
    params.validate()?;

    let h = params.height;
    let hw = params.width / 2.0;
    let bt = h * BAR_THICKNESS_RATIO;
    let mid = h * 0.5;
    let mut builder = PartBuilder {
        mesh: Mesh::new(),
        offset_x: params.offset_x,
        half_depth: params.depth / 2.0,
        palette: params.kind.palette(),
    };

    match params.kind {
        LetterKind::X => {
            builder.part(&[(-hw, h), (-hw + bt, h), (hw - bt, 0.0), (hw, 0.0)])?;
            builder.part(&[(hw, h), (hw - bt, h), (-hw + bt, 0.0), (-hw, 0.0)])?;
        }
        LetterKind::K => {
            builder.part(&[(-hw, h), (-hw + bt, h), (-hw + bt, 0.0), (-hw, 0.0)])?;
            builder.part(&[(-hw + bt, mid), (hw, h), (hw - bt, h), (-hw + bt, mid + bt)])?;
            builder.part(&[(-hw + bt, mid), (hw, 0.0), (hw - bt, 0.0), (-hw + bt, mid - bt)])?;
        }
        LetterKind::T => {
            let vw = params.width / 6.0;
            let bar = [(-hw, h), (hw, h), (hw, h - bt), (-hw, h - bt)];
            let stem = [(-vw, h - bt), (vw, h - bt), (vw, 0.0), (-vw, 0.0)];
            builder.part(&bar)?;
            builder.part(&stem)?;
            let joint = [bar[2], bar[3], stem[0], stem[1]];
            let hd = builder.half_depth;
            builder.cap(&joint, -hd)?;
            builder.cap(&joint, hd)?;
        }
        LetterKind::H => {
            builder.part(&[(-hw, h), (-hw + bt, h), (-hw + bt, 0.0), (-hw, 0.0)])?;
            builder.part(&[(hw - bt, h), (hw, h), (hw, 0.0), (hw - bt, 0.0)])?;
            let (top, bottom) = (mid + bt / 2.0, mid - bt / 2.0);
            builder.part(&[(-hw + bt, top), (hw - bt, top), (hw - bt, bottom), (-hw + bt, bottom)])?;
        }
        LetterKind::V => {
            builder.part(&[(-hw, h), (-hw + bt, h), (0.0, 0.0), (-bt, 0.0)])?;
            builder.part(&[(hw - bt, h), (hw, h), (bt, 0.0), (0.0, 0.0)])?;
        }
    }

    builder.mesh.finish();
    log::debug!(
        "built letter {}: {} vertices, {} faces",
        params.kind,
        builder.mesh.vertices().len(),
        builder.mesh.faces().len()
    );
    Ok(builder.mesh)
}

/// Extrudes cross-sections (in the XY plane) between the front and back planes
struct PartBuilder {
    mesh: Mesh,
    offset_x: f32,
    half_depth: f32,
    palette: Palette,
}

impl PartBuilder {
    fn at(&self, (x, y): (f32, f32), z: f32) -> Vector3<f32> {
        Vector3::new(self.offset_x + x, y, z)
    }

    /// Front and back faces, one side per edge, and caps for quads and larger
    fn part(&mut self, section: &[(f32, f32)]) -> Result<(), MeshError> {
        let front = self.add_section(section, -self.half_depth);
        let back = self.add_section(section, self.half_depth);

        self.mesh.add_face(front.clone(), self.palette.face)?;
        self.mesh.add_face(back.clone(), self.palette.face)?;

        let n = front.len();
        for i in 0..n {
            let next = (i + 1) % n;
            self.mesh
                .add_face(vec![front[i], front[next], back[next], back[i]], self.palette.side)?;
        }

        if n >= 4 {
            self.mesh
                .add_face(vec![front[0], front[1], back[1], back[0]], self.palette.cap)?;
            self.mesh
                .add_face(vec![front[2], front[3], back[3], back[2]], self.palette.cap)?;
        }
        Ok(())
    }

    fn add_section(&mut self, section: &[(f32, f32)], z: f32) -> Vec<usize> {
        let points: Vec<Vector3<f32>> = section.iter().map(|&p| self.at(p, z)).collect();
        points.into_iter().map(|p| self.mesh.add_vertex(p)).collect()
    }

    /// A single planar face at depth `z`
    fn cap(&mut self, section: &[(f32, f32)], z: f32) -> Result<(), MeshError> {
        let points: Vec<Vector3<f32>> = section.iter().map(|&p| self.at(p, z)).collect();
        self.mesh.add_polygon(&points, self.palette.side)?;
        Ok(())
    }
}
