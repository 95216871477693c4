//! JSON wire format for overlays.
//!
//! Telemetry sends an overlay as `{"ops": [{"type": "circle", ...}, ...]}`. Operations
//! with a `type` this crate does not know decode to [`Op::Unknown`] so that the render
//! pass, not the decoder, decides what happens to them.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::OverlayError;
use crate::model::{Op, Overlay};

/// Decodes an operation list, keeping unrecognised kinds as [`Op::Unknown`].
///
/// An op without a string `type` is unknown too, named after the raw tag or
/// `"undefined"` when it has none. A known kind with missing or mistyped fields is
/// still an error.
pub fn deserialize_ops<'de, D>(deserializer: D) -> Result<Vec<Op>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            let kind = match value.get("type") {
                Some(Value::String(kind)) => kind.clone(),
                Some(other) => return Ok(Op::Unknown { kind: other.to_string() }),
                None => {
                    return Ok(Op::Unknown {
                        kind: "undefined".to_string(),
                    });
                }
            };

            if Op::KINDS.contains(&kind.as_str()) {
                serde_json::from_value::<Op>(value)
                    .map_err(|e| D::Error::custom(format!("op {index} ({kind}): {e}")))
            } else {
                Ok(Op::Unknown { kind })
            }
        })
        .collect()
}

/// Reads a count sent as any JSON number. Integral floats such as `7.0` are accepted;
/// out-of-range values saturate.
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = f64::deserialize(deserializer)?;
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(D::Error::custom(format!("expected a whole number, got {n}")));
    }
    Ok(n as i64)
}

impl Overlay {
    pub fn from_json(json: &str) -> Result<Self, OverlayError> {
        serde_json::from_str(json).map_err(OverlayError::Decode)
    }

    /// Encodes the overlay. Fails if it holds an [`Op::Unknown`], which has no wire form.
    pub fn to_json(&self) -> Result<String, OverlayError> {
        serde_json::to_string(self).map_err(OverlayError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SplineOp;

    #[test]
    fn test_decodes_known_ops() {
        let overlay = Overlay::from_json(
            r#"{"ops": [
                {"type": "fill", "color": "red"},
                {"type": "circle", "x": 1.0, "y": 2.0, "radius": 3.0, "stroke": false},
                {"type": "strokeWidth", "width": 0.5},
                {"type": "grid", "numHorizontal": 4, "numVertical": 9},
                {"type": "polyline", "xPoints": [0, 1], "yPoints": [2, 3]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            overlay.ops,
            vec![
                Op::Fill {
                    color: "red".into()
                },
                Op::Circle {
                    x: 1.0,
                    y: 2.0,
                    radius: 3.0,
                    stroke: false
                },
                Op::StrokeWidth { width: 0.5 },
                Op::Grid {
                    num_horizontal: 4,
                    num_vertical: 9
                },
                Op::Polyline {
                    x_points: vec![0.0, 1.0],
                    y_points: vec![2.0, 3.0]
                },
            ]
        );
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let overlay = Overlay::from_json(r#"{"ops": [{"type": "hexagon", "size": 3}]}"#).unwrap();
        assert_eq!(
            overlay.ops,
            vec![Op::Unknown {
                kind: "hexagon".into()
            }]
        );
    }

    #[test]
    fn test_malformed_known_op_is_rejected() {
        let err = Overlay::from_json(r#"{"ops": [{"type": "circle", "x": 1.0}]}"#);
        assert!(matches!(err, Err(OverlayError::Decode(_))));
    }

    #[test]
    fn test_untagged_ops_decode_as_unknown() {
        let overlay = Overlay::from_json(
            r#"{"ops": [
                {"type": "circle", "x": 0, "y": 0, "radius": 1},
                {"x": 1.0},
                {"type": 7}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            overlay.ops[1..],
            [
                Op::Unknown {
                    kind: "undefined".into()
                },
                Op::Unknown { kind: "7".into() },
            ]
        );
    }

    #[test]
    fn test_grid_counts_accept_integral_floats() {
        let overlay = Overlay::from_json(
            r#"{"ops": [{"type": "grid", "numHorizontal": 7.0, "numVertical": 1e3}]}"#,
        )
        .unwrap();
        assert_eq!(
            overlay.ops[0],
            Op::Grid {
                num_horizontal: 7,
                num_vertical: 1000
            }
        );

        let fractional =
            Overlay::from_json(r#"{"ops": [{"type": "grid", "numHorizontal": 2.5, "numVertical": 3}]}"#);
        assert!(matches!(fractional, Err(OverlayError::Decode(_))));
    }

    #[test]
    fn test_text_defaults() {
        let overlay =
            Overlay::from_json(r#"{"ops": [{"type": "text", "text": "hi", "x": 1, "y": 2}]}"#)
                .unwrap();
        assert_eq!(
            overlay.ops[0],
            Op::Text {
                text: "hi".into(),
                x: 1.0,
                y: 2.0,
                font: None,
                theta: 0.0,
                stroke: false
            }
        );
    }

    #[test]
    fn test_encode_then_decode_spline() {
        let overlay = Overlay::new(vec![Op::Spline(SplineOp {
            fx: 3.0,
            fy: -4.0,
            ..SplineOp::default()
        })]);
        let json = overlay.to_json().unwrap();
        assert!(json.contains(r#""type":"spline""#));
        assert_eq!(Overlay::from_json(&json).unwrap(), overlay);
    }

    #[test]
    fn test_unknown_cannot_be_encoded() {
        let overlay = Overlay::new(vec![Op::Unknown {
            kind: "hexagon".into(),
        }]);
        assert!(matches!(overlay.to_json(), Err(OverlayError::Encode(_))));
    }
}
