//! Animation key: the CSS state of X's loading animation at a key-derived
//! point in time, flattened to a hex string.

use super::{
   indices::KeyIndices,
   numeric::{
      float_to_hex,
      js_round,
      odd_coefficient,
      round2,
   },
};
use crate::error::EngineError;

const TOTAL_ANIMATION_TIME: f64 = 4096.0;
const FRAME_COUNT: u8 = 4;
const ROW_INDEX_MODULUS: u8 = 16;
const FRAME_SELECTOR_INDEX: usize = 5;
const MIN_ROW_VALUES: usize = 11;

/// Length of the `M0 0 0 0C`-style prefix stripped before splitting segments.
const PATH_PREFIX_LEN: usize = 9;

/// Computes the animation key from decoded key bytes and the `d` attributes
/// of the loading-animation frames.
pub fn animation_key(
   key_bytes: &[u8],
   frames: &[&str],
   indices: &KeyIndices,
) -> Result<String, EngineError> {
   if frames.is_empty() {
      return Err(EngineError::MissingKey("animation frames".into()));
   }

   let frame_selector = key_bytes
      .get(FRAME_SELECTOR_INDEX)
      .ok_or_else(|| EngineError::Parse("key too short for frame selection".into()))?;
   let frame = frames
      .get(usize::from(frame_selector % FRAME_COUNT))
      .ok_or_else(|| EngineError::Parse("frame index out of bounds".into()))?;

   let row_selector = key_bytes
      .get(indices.row)
      .ok_or_else(|| EngineError::Parse("key too short for row selection".into()))?;
   let rows = path_rows(frame);
   let row = rows
      .get(usize::from(row_selector % ROW_INDEX_MODULUS))
      .ok_or_else(|| EngineError::Parse("row index out of bounds".into()))?;

   let frame_time = indices
      .key_bytes
      .iter()
      .filter_map(|&index| key_bytes.get(index))
      .map(|&byte| f64::from(byte % ROW_INDEX_MODULUS))
      .product::<f64>();
   let frame_time = js_round(frame_time / 10.0) * 10.0;

   animate(row, frame_time / TOTAL_ANIMATION_TIME)
}

/// Splits a path into its cubic segments, each parsed to integers.
fn path_rows(path_d: &str) -> Vec<Vec<i32>> {
   path_d
      .get(PATH_PREFIX_LEN..)
      .unwrap_or(path_d)
      .split('C')
      .map(|segment| {
         segment
            .split(|chr: char| !chr.is_ascii_digit() && chr != '-')
            .filter_map(|token| token.parse().ok())
            .collect()
      })
      .collect()
}

/// Scales a byte-range value into `[min, max]`.
fn solve(value: i32, min: f64, max: f64, floor: bool) -> f64 {
   let scaled = f64::from(value).mul_add((max - min) / 255.0, min);
   if floor { scaled.floor() } else { round2(scaled) }
}

/// Evaluates one frame row at `target_time` (0..1).
///
/// Row layout: start color (3), end color (3), rotation (1), easing curve (4).
#[expect(
   clippy::cast_possible_truncation,
   reason = "color channels are clamped to 0-255"
)]
fn animate(row: &[i32], target_time: f64) -> Result<String, EngineError> {
   if row.len() < MIN_ROW_VALUES {
      return Err(EngineError::Parse(format!(
         "frame has {} values, need at least {MIN_ROW_VALUES}",
         row.len()
      )));
   }

   let from_color = [row[0], row[1], row[2]].map(f64::from);
   let to_color = [row[3], row[4], row[5]].map(f64::from);
   let to_rotation = solve(row[6], 60.0, 360.0, true);

   let easing = row[7..]
      .iter()
      .enumerate()
      .map(|(idx, &val)| solve(val, odd_coefficient(idx), 1.0, false))
      .collect::<Vec<_>>();
   let progress = CubicBezier::from_points(&easing)?.ease(target_time);

   let color = interpolate(from_color, to_color, progress);
   let rotation = lerp(0.0, to_rotation, progress);

   let mut key = color
      .iter()
      .map(|channel| format!("{:x}", channel.clamp(0.0, 255.0).round() as i32))
      .collect::<String>();

   for value in rotation_matrix(rotation) {
      key.push_str(&float_to_hex(round2(value).abs()).to_lowercase());
   }
   key.push_str("00");

   Ok(key.replace(['.', '-'], ""))
}

/// Element-wise linear interpolation between two colors.
fn interpolate<const N: usize>(from: [f64; N], to: [f64; N], factor: f64) -> [f64; N] {
   let mut out = from;
   for (value, end) in out.iter_mut().zip(to) {
      *value = lerp(*value, end, factor);
   }
   out
}

fn lerp(start: f64, end: f64, factor: f64) -> f64 {
   start.mul_add(1.0 - factor, end * factor)
}

/// `[cos, -sin, sin, cos]` for a rotation in degrees.
fn rotation_matrix(degrees: f64) -> [f64; 4] {
   let (sin, cos) = degrees.to_radians().sin_cos();
   [cos, -sin, sin, cos]
}

/// Easing curve with implicit endpoints (0,0) and (1,1), like CSS
/// `cubic-bezier(x1, y1, x2, y2)`.
#[derive(Debug)]
struct CubicBezier {
   x1: f64,
   y1: f64,
   x2: f64,
   y2: f64,
}

impl CubicBezier {
   const TOLERANCE: f64 = 0.00001;
   const MAX_ITERATIONS: usize = 64;

   fn from_points(points: &[f64]) -> Result<Self, EngineError> {
      match *points {
         [x1, y1, x2, y2, ..] => Ok(Self { x1, y1, x2, y2 }),
         _ => Err(EngineError::Parse(format!(
            "easing curve needs 4 control values, got {}",
            points.len()
         ))),
      }
   }

   /// Progress (Y) at `time` (X). Outside `[0, 1]` the curve is extended
   /// linearly along its end tangents.
   #[expect(clippy::float_cmp, reason = "exact control-point boundary checks")]
   fn ease(&self, time: f64) -> f64 {
      if time <= 0.0 {
         let gradient = if self.x1 > 0.0 {
            self.y1 / self.x1
         } else if self.y1 == 0.0 && self.x2 > 0.0 {
            self.y2 / self.x2
         } else {
            0.0
         };
         return gradient * time;
      }

      if time >= 1.0 {
         let gradient = if self.x2 < 1.0 {
            (self.y2 - 1.0) / (self.x2 - 1.0)
         } else if self.x2 == 1.0 && self.x1 < 1.0 {
            (self.y1 - 1.0) / (self.x1 - 1.0)
         } else {
            0.0
         };
         return gradient.mul_add(time - 1.0, 1.0);
      }

      // Bisect on the curve parameter until its X matches `time`.
      let (mut low, mut high) = (0.0_f64, 1.0_f64);
      let mut param = 0.5;
      for _ in 0..Self::MAX_ITERATIONS {
         param = f64::midpoint(low, high);
         let estimate = bezier(self.x1, self.x2, param);
         if (time - estimate).abs() < Self::TOLERANCE {
            break;
         }
         if estimate < time {
            low = param;
         } else {
            high = param;
         }
      }

      bezier(self.y1, self.y2, param)
   }
}

/// One coordinate of the curve: `3·p1·(1-t)²·t + 3·p2·(1-t)·t² + t³`.
fn bezier(p1: f64, p2: f64, param: f64) -> f64 {
   let rest = 1.0 - param;
   let param_sq = param * param;
   (3.0 * p1 * rest * rest).mul_add(param, (3.0 * p2 * rest).mul_add(param_sq, param_sq * param))
}
