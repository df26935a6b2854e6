//! # Shell Thickness Formulas (API 650 Section 5.6 and Annex A)
//!
//! Pure functions, canonical units throughout:
//! - `d`: nominal diameter (m)
//! - `head`: design liquid level above the bottom of the ring (m)
//! - `g`: relative density
//! - `s`, `sd`, `st`: allowable stress (MPa)
//! - `ca`: corrosion allowance (mm)
//! - `r`: nominal radius (mm)
//! - thicknesses: mm
//!
//! The 4.9 factor is 1000·ρ_water·g / 2 with D in m and S in MPa.

/// Diameter below which the bottom ring is at least 6 mm (API 650 5.6.1.1 Note 4)
pub const SMALL_TANK_DIAMETER_M: f64 = 15.0;

/// Bottom ring minimum for small tanks (mm)
pub const SMALL_TANK_BOTTOM_RING_MIN_MM: f64 = 6.0;

/// Largest diameter the one-foot method may be used for (API 650 5.6.3.1)
pub const FIXED_POINT_MAX_DIAMETER_M: f64 = 61.0;

/// Largest ring thickness Annex A may be used for (API 650 A.1.1)
pub const ANNEX_A_MAX_THICKNESS_MM: f64 = 13.0;

/// Annex A allowable stress (MPa), applied with the joint efficiency
pub const ANNEX_A_ALLOWABLE_STRESS_MPA: f64 = 145.0;

/// Upper bound of L/H for the variable-design-point method (API 650 5.6.4.1)
pub const SLENDERNESS_LIMIT: f64 = 1000.0 / 6.0;

/// Second-ring ratio at or below which the bottom ring thickness carries over
pub const SECOND_RING_RATIO_LOWER: f64 = 1.375;

/// Second-ring ratio at or above which the upper-ring thickness applies
pub const SECOND_RING_RATIO_UPPER: f64 = 2.625;

/// Minimum nominal shell thickness (API 650 5.6.1.1)
///
/// | D (m)       | t_min (mm) |
/// |-------------|------------|
/// | < 15        | 5          |
/// | 15 to < 36  | 6          |
/// | 36 to 60    | 8          |
/// | > 60        | 10         |
///
/// ```rust
/// use tank_core::equations::minimum_thickness;
///
/// assert_eq!(minimum_thickness(14.99), 5.0);
/// assert_eq!(minimum_thickness(15.0), 6.0);
/// assert_eq!(minimum_thickness(60.0), 8.0);
/// assert_eq!(minimum_thickness(60.01), 10.0);
/// ```
pub fn minimum_thickness(d: f64) -> f64 {
    if d < 15.0 {
        5.0
    } else if d < 36.0 {
        6.0
    } else if d <= 60.0 {
        8.0
    } else {
        10.0
    }
}

/// Note 4 of 5.6.1.1: a bottom ring of a tank under 15 m that is still
/// below 6 mm after the minimum is applied is raised to exactly 6 mm.
pub fn small_tank_bottom_ring_applies(d: f64, ring_index: usize, thickness: f64) -> bool {
    ring_index == 0 && d < SMALL_TANK_DIAMETER_M && thickness < SMALL_TANK_BOTTOM_RING_MIN_MM
}

/// Annex A thickness (A.4.1)
///
/// t = 4.9·D·(H - 0.3)·G / (E·145) + CA
#[inline]
pub fn annex_a_thickness(d: f64, head: f64, g: f64, e: f64, ca: f64) -> f64 {
    4.9 * d * (head - 0.3) * g / (e * ANNEX_A_ALLOWABLE_STRESS_MPA) + ca
}

/// One-foot method, design condition (5.6.3.2)
///
/// t_d = 4.9·D·(H - 0.3)·G / S_d + CA
#[inline]
pub fn one_foot_design_thickness(d: f64, head: f64, g: f64, sd: f64, ca: f64) -> f64 {
    4.9 * d * (head - 0.3) * g / sd + ca
}

/// One-foot method, hydrostatic test condition (5.6.3.2)
///
/// t_t = 4.9·D·(H - 0.3) / S_t
#[inline]
pub fn one_foot_hydrotest_thickness(d: f64, head: f64, st: f64) -> f64 {
    4.9 * d * (head - 0.3) / st
}

/// Variable-point bottom ring, design condition (5.6.4.4)
///
/// t_1d = (1.06 - (0.069·D/H)·√(H·G/S_d))·(4.9·H·D·G/S_d) + CA
pub fn bottom_ring_design_thickness(d: f64, h: f64, g: f64, sd: f64, ca: f64) -> f64 {
    (1.06 - (0.069 * d / h) * (h * g / sd).sqrt()) * (4.9 * h * d * g / sd) + ca
}

/// Variable-point bottom ring, hydrostatic test condition (5.6.4.4)
///
/// t_1t = (1.06 - (0.069·D/H)·√(H/S_t))·(4.9·H·D/S_t)
pub fn bottom_ring_hydrotest_thickness(d: f64, h: f64, st: f64) -> f64 {
    (1.06 - (0.069 * d / h) * (h / st).sqrt()) * (4.9 * h * d / st)
}

/// L/H with L = √(500·D·t), t the corroded bottom ring thickness (5.6.4.1)
pub fn slenderness_ratio(d: f64, h: f64, t_corroded: f64) -> f64 {
    (500.0 * d * t_corroded).sqrt() / h
}

/// Second ring ratio h1/√(r·t1) (5.6.4.5), h1 the bottom ring height (mm)
pub fn second_ring_ratio(h1: f64, r: f64, t1: f64) -> f64 {
    h1 / (r * t1).sqrt()
}

/// Second ring thickness in the transition band 1.375 < ratio < 2.625 (5.6.4.5)
///
/// t_2 = t_2a + (t_1 - t_2a)·(2.1 - h1 / (1.25·√(r·t1)))
pub fn second_ring_transition_thickness(t2a: f64, t1: f64, h1: f64, r: f64) -> f64 {
    t2a + (t1 - t2a) * (2.1 - h1 / (1.25 * (r * t1).sqrt()))
}

/// Shape factor C (5.6.4.6)
///
/// C = √K·(K - 1) / (1 + K^1.5), K = t_L / t_u
pub fn shape_factor(k: f64) -> f64 {
    k.sqrt() * (k - 1.0) / (1.0 + k.powf(1.5))
}

/// Variable design point candidates (5.6.4.6), all in mm:
///
/// - x1 = 0.61·√(r·t_u) + 320·C·H
/// - x2 = 1000·C·H
/// - x3 = 1.22·√(r·t_u)
pub fn design_point_candidates(r: f64, tu: f64, c: f64, head: f64) -> (f64, f64, f64) {
    let root = (r * tu).sqrt();
    (0.61 * root + 320.0 * c * head, 1000.0 * c * head, 1.22 * root)
}

/// Upper ring thickness at the variable design point x (mm) (5.6.4.7)
///
/// t = 4.9·D·(H - x/1000)·G / S + CA
///
/// The hydrostatic test condition uses `g = 1` and `ca = 0`.
#[inline]
pub fn variable_point_thickness(d: f64, head: f64, x: f64, g: f64, s: f64, ca: f64) -> f64 {
    4.9 * d * (head - x / 1000.0) * g / s + ca
}
