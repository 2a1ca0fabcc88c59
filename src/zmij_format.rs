//! Float text for YAML output.
//!
//! zmij renders the shortest round-tripping digits but may omit the fraction
//! (`4e-6`, `3`), which YAML would read back as something other than a float.

use num_traits::float::FloatCore;
use zmij::Float;

/// Append `f` as a YAML 1.2 core-schema float.
pub(crate) fn push_float_string<F: Float + FloatCore>(target: &mut String, f: F) {
    if f.is_nan() {
        target.push_str(".nan");
    } else if f.is_infinite() {
        if f.is_sign_positive() {
            target.push_str(".inf");
        } else {
            target.push_str("-.inf");
        }
    } else {
        let mut buf = zmij::Buffer::new();
        let s = buf.format_finite(f);
        if s.as_bytes().contains(&b'.') {
            target.push_str(s);
        } else if let Some(exp_pos) = s.find(['e', 'E']) {
            // "4e-6" -> "4.0e-6"
            target.push_str(&s[..exp_pos]);
            target.push_str(".0");
            target.push_str(&s[exp_pos..]);
        } else {
            target.push_str(s);
            target.push_str(".0");
        }
    }
}
