//! Tidal constituent table.
//!
//! This module contains the angular speeds, in degrees per hour, of the tidal
//! constituents that can be used as zero constraints when designing filter
//! weights with [`thompson_weights`](crate::thompson_weights). Most speeds are
//! computed from the mean astronomical rates of the Earth's rotation relative
//! to the Moon, the Moon's longitude, the Sun's longitude, the lunar perigee
//! and the solar perigee. The remaining ones are tabulated values.

use crate::error::{Error, Result};
use num_traits::{Float, FloatConst};

/// Tidal constituent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Constituent {
    /// Conventional name of the constituent (for instance `"M2"`).
    pub name: &'static str,
    /// Angular speed in degrees per hour.
    pub speed: f64,
}

/// Name under which the local inertial frequency is reported.
pub const LOCAL_INERTIAL: &str = "local inertial";

/// Constituents suppressed by the "120i913" filter of Thompson (1983).
pub const DEFAULT_CONSTITUENTS: [&str; 7] = ["Q1", "O1", "K1", "N2", "M2", "L2", "S2"];

// Mean astronomical rates in degrees per hour.
const ROT: f64 = 15.0;
const MOON: f64 = 0.54901653;
const SUN: f64 = 0.04106864;
const PERIGEE: f64 = 0.00464183;
const PERIHELION: f64 = 0.00000196;

const fn entry(name: &'static str, speed: f64) -> Constituent {
    Constituent { name, speed }
}

/// Table of known tidal constituents.
pub static CONSTITUENTS: [Constituent; 38] = [
    entry("M2", 2.0 * ROT - 2.0 * MOON + 2.0 * SUN),
    entry("S2", 2.0 * ROT),
    entry("N2", 2.0 * ROT - 3.0 * MOON + 2.0 * SUN + PERIGEE),
    entry("K1", 15.0410686),
    entry("M4", 4.0 * (ROT - MOON + SUN)),
    entry("O1", ROT - 2.0 * MOON + SUN),
    entry("M6", 6.0 * (ROT - MOON + SUN)),
    entry("MK3", 44.0251729),
    entry("S4", 4.0 * ROT),
    entry("MN4", 57.4238337),
    entry("NU2", 28.5125831),
    entry("S6", 6.0 * ROT),
    entry("MU2", 27.9682084),
    entry("2N2", 2.0 * ROT - 4.0 * MOON + 2.0 * SUN + 2.0 * PERIGEE),
    entry("OO1", ROT + 2.0 * MOON + SUN),
    entry("LAM2", 29.4556253),
    entry("S1", ROT),
    entry("M1", ROT - MOON + SUN + PERIGEE),
    entry("J1", 15.5854433),
    entry("MM", MOON - PERIGEE),
    entry("SSA", 2.0 * SUN),
    entry("SA", SUN),
    entry("MSF", 2.0 * MOON - 2.0 * SUN),
    entry("MF", 2.0 * MOON),
    entry("RHO", ROT - 3.0 * MOON + 3.0 * SUN - PERIGEE),
    entry("Q1", ROT - 3.0 * MOON + SUN + PERIGEE),
    entry("T2", 2.0 * ROT - SUN + PERIHELION),
    entry("R2", 2.0 * ROT + SUN - PERIHELION),
    entry("2Q1", ROT - 4.0 * MOON + SUN + 2.0 * PERIGEE),
    entry("P1", ROT - SUN),
    entry("2SM2", 31.0158958),
    entry("M3", 3.0 * ROT - 3.0 * MOON + 3.0 * SUN),
    entry("L2", 29.5284789),
    entry("2MK3", 42.9271398),
    entry("K2", 30.0821373),
    entry("M8", 8.0 * (ROT - MOON + SUN)),
    entry("MS4", 58.9841042),
    entry("N", 0.00220641),
];

/// Returns the constituent with a given name, if it is in the table.
///
/// Names are matched exactly, including case.
pub fn constituent(name: &str) -> Option<&'static Constituent> {
    CONSTITUENTS.iter().find(|c| c.name == name)
}

/// Returns the angular speed in degrees per hour of a named constituent.
///
/// An [`Error::UnknownConstituent`] is returned if the name is not in the
/// table.
pub fn speed(name: &str) -> Result<f64> {
    constituent(name)
        .map(|c| c.speed)
        .ok_or_else(|| Error::UnknownConstituent(name.to_string()))
}

/// Returns the local inertial frequency in degrees per hour.
///
/// The inertial frequency is `2 sin(|latitude|) * 360 / 24`. An
/// [`Error::InvalidLatitude`] is returned if the latitude is not finite or is
/// outside [-90, 90] degrees.
pub fn local_inertial_speed<T: Float + FloatConst>(latitude: T) -> Result<T> {
    check_latitude(latitude)?;
    let two = T::from(2).unwrap();
    let rad = latitude.abs() * T::PI() / T::from(180).unwrap();
    Ok(two * rad.sin() * T::from(360).unwrap() / T::from(24).unwrap())
}

pub(crate) fn check_latitude<T: Float>(latitude: T) -> Result<()> {
    if !latitude.is_finite() || latitude.abs() > T::from(90).unwrap() {
        return Err(Error::InvalidLatitude);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup() {
        assert_eq!(speed("S2").unwrap(), 30.0);
        assert_eq!(speed("K1").unwrap(), 15.0410686);
        assert!((speed("M2").unwrap() - 28.9841042).abs() < 1e-7);
        assert!((speed("O1").unwrap() - 13.9430356).abs() < 1e-7);
        assert!(constituent("m2").is_none());
    }

    #[test]
    fn unknown() {
        match speed("Z0") {
            Err(Error::UnknownConstituent(name)) => assert_eq!(name, "Z0"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn names_are_unique() {
        for (j, a) in CONSTITUENTS.iter().enumerate() {
            assert!(CONSTITUENTS[j + 1..].iter().all(|b| b.name != a.name));
        }
    }

    #[test]
    fn defaults_are_known() {
        for name in DEFAULT_CONSTITUENTS {
            assert!(constituent(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn inertial() {
        assert_eq!(local_inertial_speed(0.0).unwrap(), 0.0);
        assert!((local_inertial_speed(90.0).unwrap() - 30.0).abs() < 1e-12);
        let north = local_inertial_speed(33.86).unwrap();
        let south = local_inertial_speed(-33.86).unwrap();
        assert_eq!(north, south);
        assert!((north - 16.714965).abs() < 1e-5);
        assert!(matches!(local_inertial_speed(91.0), Err(Error::InvalidLatitude)));
        assert!(matches!(local_inertial_speed(-90.5), Err(Error::InvalidLatitude)));
        assert!(matches!(local_inertial_speed(f64::NAN), Err(Error::InvalidLatitude)));
    }
}
