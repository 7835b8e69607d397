//! Numeric helpers that reproduce the web client's JavaScript arithmetic.

/// Lower bound for the `idx`-th easing control value: `-1.0` for the Y
/// coordinates (odd positions), `0.0` for the X coordinates.
pub const fn odd_coefficient(idx: usize) -> f64 {
   if idx % 2 == 1 { -1.0 } else { 0.0 }
}

/// `Math.round()`: halves round toward positive infinity, so -2.5 becomes -2.
pub fn js_round(num: f64) -> f64 {
   (num + 0.5).floor()
}

/// Rounds to two decimal places.
pub fn round2(num: f64) -> f64 {
   (num * 100.0).round() / 100.0
}

/// Formats a non-negative number in uppercase hex, fraction included
/// (`10.0` is `"A"`, `0.5` is `"0.8"`). Output stops after 21 characters.
#[expect(
   clippy::cast_possible_truncation,
   clippy::cast_sign_loss,
   reason = "callers pass small non-negative values"
)]
#[expect(
   clippy::while_float,
   reason = "the fraction shrinks to zero or the length cap stops the loop"
)]
pub fn float_to_hex(value: f64) -> String {
   const MAX_LEN: usize = 21;

   let whole = value.trunc();
   let mut out = format!("{:X}", whole as u64);

   let mut fraction = value - whole;
   if fraction > 0.0 {
      out.push('.');
      while fraction > 0.0 && out.len() < MAX_LEN {
         fraction *= 16.0;
         let digit = fraction.trunc();
         fraction -= digit;
         out.push(hex_digit(digit as u32));
      }
   }

   out
}

fn hex_digit(digit: u32) -> char {
   char::from_digit(digit, 16).map_or('?', |chr| chr.to_ascii_uppercase())
}
