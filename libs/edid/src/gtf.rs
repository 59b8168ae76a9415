//! VESA Generalized Timing Formula, version 1.1.
//!
//! Pure numeric helper: derives a complete timing from the active area and
//! one driving frequency.

use serde::Serialize;

use crate::descriptors::SecondaryGtf;

/// Assumed character cell granularity of the graphics system, in pixels.
const CELL_GRAN: f64 = 8.0;
/// Top and bottom overscan margin, as a percentage of the active vertical image.
const MARGIN_PERC: f64 = 1.8;
/// Minimum front porch in lines (vertical) and character cells (horizontal).
const MIN_PORCH: f64 = 1.0;
/// V-sync width in lines.
const V_SYNC_RQD: f64 = 3.0;
/// H-sync width as a percentage of the total line period.
const H_SYNC_PERC: f64 = 8.0;
/// Minimum time of vertical sync + back porch interval, in microseconds.
const MIN_VSYNC_BP: f64 = 550.0;

pub const DEFAULT_M: f64 = 600.0;
pub const DEFAULT_C: f64 = 40.0;
pub const DEFAULT_K: f64 = 128.0;
pub const DEFAULT_J: f64 = 20.0;

/// Which frequency drives the computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GtfTarget {
    /// Vertical frame rate, in Hz
    VerticalFrameRate(f64),
    /// Horizontal frequency, in kHz
    HorizontalFrequency(f64),
    /// Pixel clock, in MHz
    PixelClock(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GtfOptions {
    /// Active pixels per line, not including margins
    pub h_pixels: i32,
    /// Active lines
    pub v_lines: i32,
    pub margins_rqd: bool,
    pub int_rqd: bool,
    pub target: GtfTarget,
    /// Blanking formula gradient
    pub m: f64,
    /// Blanking formula offset
    pub c: f64,
    /// Blanking formula scaling factor
    pub k: f64,
    /// Blanking formula scaling factor weighting
    pub j: f64,
}

impl GtfOptions {
    /// Options using the default blanking formula parameters.
    pub fn new(h_pixels: i32, v_lines: i32, target: GtfTarget) -> Self {
        Self {
            h_pixels,
            v_lines,
            margins_rqd: false,
            int_rqd: false,
            target,
            m: DEFAULT_M,
            c: DEFAULT_C,
            k: DEFAULT_K,
            j: DEFAULT_J,
        }
    }

    /// Options using the blanking formula advertised by a display range
    /// limits descriptor. The secondary curve only applies above its start
    /// frequency; callers pick which curve to use.
    pub fn with_secondary_curve(mut self, curve: &SecondaryGtf) -> Self {
        self.m = f64::from(curve.m);
        self.c = f64::from(curve.c);
        self.k = f64::from(curve.k);
        self.j = f64::from(curve.j);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GtfTiming {
    pub h_pixels: i32,
    pub v_lines: i32,
    pub h_sync: i32,
    pub v_sync: i32,
    pub h_front_porch: i32,
    pub h_back_porch: i32,
    pub v_front_porch: i32,
    pub v_back_porch: i32,
    pub h_border: i32,
    pub v_border: i32,
    pub pixel_freq_mhz: f64,
}

fn blank_pixels(total_active_pixels: f64, ideal_duty_cycle: f64) -> f64 {
    (total_active_pixels * ideal_duty_cycle / (100.0 - ideal_duty_cycle) / (2.0 * CELL_GRAN))
        .round()
        * 2.0
        * CELL_GRAN
}

/// Computes a timing with the GTF.
pub fn compute(options: &GtfOptions) -> GtfTiming {
    // C' and M' feed the blanking duty cycle
    let c_prime = ((options.c - options.j) * options.k / 256.0) + options.j;
    let m_prime = options.k / 256.0 * options.m;

    let h_pixels_rnd = (f64::from(options.h_pixels) / CELL_GRAN).round() * CELL_GRAN;
    let v_lines_rnd = if options.int_rqd {
        (f64::from(options.v_lines) / 2.0).round()
    } else {
        f64::from(options.v_lines)
    };
    let h_margin = if options.margins_rqd {
        (h_pixels_rnd * MARGIN_PERC / 100.0 / CELL_GRAN).round() * CELL_GRAN
    } else {
        0.0
    };
    let v_margin = if options.margins_rqd {
        (MARGIN_PERC / 100.0 * v_lines_rnd).round()
    } else {
        0.0
    };
    let interlace = if options.int_rqd { 0.5 } else { 0.0 };
    let total_active_pixels = h_pixels_rnd + h_margin * 2.0;

    let (h_blank_pixels, total_pixels, v_sync_bp, pixel_freq) = match options.target {
        GtfTarget::VerticalFrameRate(rate) => {
            let v_field_rate_rqd = if options.int_rqd { rate * 2.0 } else { rate };
            let h_period_est = (1.0 / v_field_rate_rqd - MIN_VSYNC_BP / 1_000_000.0)
                / (v_lines_rnd + v_margin * 2.0 + MIN_PORCH + interlace)
                * 1_000_000.0;
            let v_sync_bp = (MIN_VSYNC_BP / h_period_est).round();
            let total_v_lines = v_lines_rnd + v_margin * 2.0 + v_sync_bp + interlace + MIN_PORCH;
            let v_field_rate_est = 1.0 / h_period_est / total_v_lines * 1_000_000.0;
            let h_period = h_period_est / (v_field_rate_rqd / v_field_rate_est);
            let ideal_duty_cycle = c_prime - m_prime * h_period / 1000.0;
            let h_blank_pixels = blank_pixels(total_active_pixels, ideal_duty_cycle);
            let total_pixels = total_active_pixels + h_blank_pixels;
            (
                h_blank_pixels,
                total_pixels,
                v_sync_bp,
                total_pixels / h_period,
            )
        }
        GtfTarget::HorizontalFrequency(h_freq) => {
            let v_sync_bp = (MIN_VSYNC_BP * h_freq / 1000.0).round();
            let ideal_duty_cycle = c_prime - m_prime / h_freq;
            let h_blank_pixels = blank_pixels(total_active_pixels, ideal_duty_cycle);
            let total_pixels = total_active_pixels + h_blank_pixels;
            (
                h_blank_pixels,
                total_pixels,
                v_sync_bp,
                total_pixels * h_freq / 1000.0,
            )
        }
        GtfTarget::PixelClock(pixel_freq) => {
            let ideal_h_period = (c_prime - 100.0
                + ((100.0 - c_prime) * (100.0 - c_prime)
                    + 0.4 * m_prime * (total_active_pixels + h_margin * 2.0) / pixel_freq)
                    .sqrt())
                / 2.0
                / m_prime
                * 1000.0;
            let ideal_duty_cycle = c_prime - m_prime * ideal_h_period / 1000.0;
            let h_blank_pixels = blank_pixels(total_active_pixels, ideal_duty_cycle);
            let total_pixels = total_active_pixels + h_blank_pixels;
            let h_freq = pixel_freq / total_pixels * 1000.0;
            let v_sync_bp = (MIN_VSYNC_BP * h_freq / 1000.0).round();
            (h_blank_pixels, total_pixels, v_sync_bp, pixel_freq)
        }
    };

    let v_back_porch = v_sync_bp - V_SYNC_RQD;
    let h_sync = (H_SYNC_PERC / 100.0 * total_pixels / CELL_GRAN).round() * CELL_GRAN;
    let h_front_porch = h_blank_pixels / 2.0 - h_sync;

    GtfTiming {
        h_pixels: h_pixels_rnd as i32,
        v_lines: options.v_lines,
        h_sync: h_sync as i32,
        v_sync: V_SYNC_RQD as i32,
        h_front_porch: h_front_porch as i32,
        h_back_porch: (h_front_porch + h_sync) as i32,
        v_front_porch: MIN_PORCH as i32,
        v_back_porch: v_back_porch as i32,
        h_border: h_margin as i32,
        v_border: v_margin as i32,
        pixel_freq_mhz: pixel_freq,
    }
}
