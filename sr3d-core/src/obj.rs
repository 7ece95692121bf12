/// Wavefront OBJ parser (positions and faces only)
use std::path::Path;

use log::debug;
use nalgebra::Vector3;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, opt},
    multi::separated_list1,
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::mesh::{Face, Mesh, Vertex};

/// Parse OBJ text into a white mesh.
///
/// `v x y z [w]` and `f a b c ...` are understood; texture and normal
/// references in `a/b/c` face tokens are skipped and polygons are fanned
/// into triangles. Comments and every other statement are ignored.
///
/// Face indices are 1-based. Negative indices count back from the total
/// number of vertices in the file, `-1` being the last one.
pub fn parse_obj(text: &str) -> Result<Mesh> {
    let mut positions = Vec::new();
    let mut polygons = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line_number = number + 1;
        let line = line.split('#').next().unwrap_or("").trim();

        match line.split_whitespace().next() {
            Some("v") => {
                let (_, position) = all_consuming(parse_vertex)(line)
                    .map_err(|e| parse_error(line_number, "malformed vertex", e))?;
                positions.push(position);
            }
            Some("f") => {
                let (_, indices) = all_consuming(parse_face)(line)
                    .map_err(|e| parse_error(line_number, "malformed face", e))?;
                if indices.len() < 3 {
                    return Err(Error::ObjParse {
                        line: line_number,
                        message: format!("face has {} vertices, at least 3 needed", indices.len()),
                    });
                }
                polygons.push(indices);
            }
            _ => {}
        }
    }

    let vertex_count = positions.len();
    let mut faces = Vec::with_capacity(polygons.len());
    for polygon in &polygons {
        let resolved = polygon
            .iter()
            .map(|&index| resolve_index(index, vertex_count))
            .collect::<Result<Vec<u32>>>()?;

        for k in 1..resolved.len() - 1 {
            faces.push(Face::new(resolved[0], resolved[k], resolved[k + 1]));
        }
    }

    let vertices = positions
        .into_iter()
        .map(|position| Vertex {
            position,
            color: Color::WHITE,
        })
        .collect();

    Mesh::new(vertices, faces)
}

/// Read and parse an OBJ file.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let mesh = parse_obj(&text)?;
    debug!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertices().len(),
        mesh.faces().len()
    );
    Ok(mesh)
}

fn resolve_index(index: i64, vertex_count: usize) -> Result<u32> {
    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => vertex_count as i64 + i,
        _ => -1,
    };

    if resolved < 0 || resolved >= vertex_count as i64 {
        return Err(Error::MeshIndexOutOfRange { index, vertex_count });
    }
    Ok(resolved as u32)
}

fn parse_error(line: usize, what: &str, err: nom::Err<nom::error::Error<&str>>) -> Error {
    let message = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => format!("{what} near {:?}", e.input),
        nom::Err::Incomplete(_) => what.to_string(),
    };
    Error::ObjParse { line, message }
}

fn parse_vertex(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = terminated(tag("v"), space1)(input)?;
    let (input, x) = float(input)?;
    let (input, y) = preceded(space1, float)(input)?;
    let (input, z) = preceded(space1, float)(input)?;
    let (input, _) = opt(preceded(space1, float))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

fn parse_face(input: &str) -> IResult<&str, Vec<i64>> {
    let (input, _) = terminated(tag("f"), space1)(input)?;
    let (input, indices) = separated_list1(space1, parse_face_index)(input)?;
    let (input, _) = space0(input)?;
    Ok((input, indices))
}

// `a`, `a/b`, `a//c` or `a/b/c`: only the position index is kept
fn parse_face_index(input: &str) -> IResult<&str, i64> {
    terminated(
        integer,
        opt(preceded(char('/'), take_till(|c: char| c.is_whitespace()))),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TETRAHEDRON: &str = "\
# a tetrahedron
o tetra
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
v 0.0 0.0 1.0 1.0
vn 0.0 0.0 1.0
f 1 3 2
f 1 2 4
f 1 4 3
f 2 3 4
";

    #[test]
    fn test_parse_tetrahedron() {
        let mesh = parse_obj(TETRAHEDRON).unwrap();
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.faces().len(), 4);
        assert_eq!(mesh.faces()[0], Face::new(0, 2, 1));
        assert_eq!(mesh.vertices()[3].position, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_negative_indices_count_from_total() {
        // Faces may come before the vertices they reference
        let text = "f -3 -2 -1\nv 0 0 0\nv 1 0 0\nv 0 1 0\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.faces(), &[Face::new(0, 1, 2)]);
    }

    #[test]
    fn test_slash_forms_and_fan_triangulation() {
        let text = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
f 1/1 2//3 3/1/2 4
";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.faces(), &[Face::new(0, 1, 2), Face::new(0, 2, 3)]);
    }

    #[test]
    fn test_index_errors() {
        let zero = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n");
        assert!(matches!(zero, Err(Error::MeshIndexOutOfRange { index: 0, .. })));

        let too_big = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n");
        assert!(matches!(
            too_big,
            Err(Error::MeshIndexOutOfRange { index: 4, vertex_count: 3 })
        ));

        let too_negative = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -4 1 2\n");
        assert!(matches!(too_negative, Err(Error::MeshIndexOutOfRange { index: -4, .. })));
    }

    #[test]
    fn test_malformed_lines_report_line_number() {
        let err = parse_obj("v 0 0 0\nv 1 zero 0\n").unwrap_err();
        assert!(matches!(err, Error::ObjParse { line: 2, .. }));

        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, Error::ObjParse { line: 3, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(load_obj("/nonexistent/model.obj"), Err(Error::Io(_))));
    }
}
