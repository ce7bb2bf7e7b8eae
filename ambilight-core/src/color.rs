//! Farbtemperatur → RGB Umrechnung
//!
//! Näherung nach Tanner Helland, gültig von 1000K bis 40000K.
//! Reine Funktionen ohne Hardware-Dependencies (testbar!)

use rgb::RGB8;

/// Untere Grenze des Definitionsbereichs in Kelvin
pub const MIN_KELVIN: u32 = 1_000;

/// Obere Grenze des Definitionsbereichs in Kelvin
pub const MAX_KELVIN: u32 = 40_000;

/// Rechnet Mired in Kelvin um (`1_000_000 / mired`, ganzzahlig)
///
/// Gibt `None` zurück für 0 Mired (Division durch Null).
///
/// ```
/// # use ambilight_core::mired_to_kelvin;
/// assert_eq!(mired_to_kelvin(153), Some(6535));
/// assert_eq!(mired_to_kelvin(0), None);
/// ```
pub fn mired_to_kelvin(mired: u32) -> Option<u32> {
    if mired == 0 {
        return None;
    }
    Some(1_000_000 / mired)
}

/// Rechnet eine Farbtemperatur in eine RGB-Farbe um
///
/// Die Eingabe wird auf [1000K, 40000K] begrenzt. Jeder Kanal wird
/// auf [0, 255] geklemmt und danach Richtung Null abgeschnitten.
///
/// # Beispiele
///
/// ```
/// # use rgb::RGB8;
/// # use ambilight_core::kelvin_to_rgb;
/// assert_eq!(kelvin_to_rgb(6600), RGB8 { r: 255, g: 255, b: 255 });
/// ```
pub fn kelvin_to_rgb(kelvin: u32) -> RGB8 {
    let temp = f64::from(kelvin.clamp(MIN_KELVIN, MAX_KELVIN)) / 100.0;

    let red = if temp <= 66.0 {
        255.0
    } else {
        329.698727446 * libm::pow(temp - 60.0, -0.1332047592)
    };

    let green = if temp <= 66.0 {
        99.4708025861 * libm::log(temp) - 161.1195681661
    } else {
        288.1221695283 * libm::pow(temp - 60.0, -0.0755148492)
    };

    let blue = if temp >= 66.0 {
        255.0
    } else if temp <= 19.0 {
        0.0
    } else {
        138.5177312231 * libm::log(temp - 10.0) - 305.0447927307
    };

    RGB8 {
        r: to_channel(red),
        g: to_channel(green),
        b: to_channel(blue),
    }
}

// Klemmen auf 8 Bit, dann abschneiden (kein Runden)
fn to_channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_white_at_6600k() {
        assert_eq!(kelvin_to_rgb(6600), RGB8 { r: 255, g: 255, b: 255 });
    }

    #[test]
    fn test_warm_end_has_no_blue() {
        let color = kelvin_to_rgb(1000);
        assert_eq!(color, RGB8 { r: 255, g: 67, b: 0 });
    }

    #[test]
    fn test_cold_end_is_full_blue() {
        let color = kelvin_to_rgb(40_000);
        assert_eq!(color.b, 255);
        assert_eq!(color, RGB8 { r: 151, g: 185, b: 255 });
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(kelvin_to_rgb(0), kelvin_to_rgb(MIN_KELVIN));
        assert_eq!(kelvin_to_rgb(500), kelvin_to_rgb(MIN_KELVIN));
        assert_eq!(kelvin_to_rgb(1_000_000), kelvin_to_rgb(MAX_KELVIN));
    }

    #[test]
    fn test_mid_range_values_are_truncated() {
        // 2700K: g ≈ 166.72, b ≈ 87.41
        assert_eq!(kelvin_to_rgb(2700), RGB8 { r: 255, g: 166, b: 87 });
        // 10000K: r ≈ 201.70, g ≈ 218.07
        assert_eq!(kelvin_to_rgb(10_000), RGB8 { r: 201, g: 218, b: 255 });
    }

    #[test]
    fn test_mired_153_is_6535k() {
        let kelvin = mired_to_kelvin(153).unwrap();
        assert_eq!(kelvin, 6535);
        assert_eq!(kelvin_to_rgb(kelvin), RGB8 { r: 255, g: 254, b: 250 });
    }

    #[test]
    fn test_zero_mired_is_rejected() {
        assert_eq!(mired_to_kelvin(0), None);
        assert_eq!(mired_to_kelvin(1), Some(1_000_000));
    }

    #[test]
    fn test_large_mired_clamps_to_min_kelvin() {
        let kelvin = mired_to_kelvin(70_000).unwrap();
        assert_eq!(kelvin, 14);
        assert_eq!(kelvin_to_rgb(kelvin), kelvin_to_rgb(MIN_KELVIN));
    }
}
