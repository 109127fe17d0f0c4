use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};
use lt8912b_core::{classify, SyncMeasurement, TimingMode};

use crate::error::Result;
use crate::regs::{self, SubDevice};
use crate::sequencer::Sequencer;

/// 1回の検出の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// 上位バイトが前回から変化していない（何も書き込まない）
    Unchanged(SyncMeasurement),
    /// 新しい入力として分類し、タイミングを再設定した
    Applied {
        mode: TimingMode,
        measurement: SyncMeasurement,
    },
}

/// 入力タイミング検出器
///
/// 前回の測定値を保持し、同期幅の上位バイトが変化したときだけ再設定します。
#[derive(Debug, Default)]
pub struct TimingDetector {
    last: SyncMeasurement,
    active: Option<TimingMode>,
}

impl TimingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_measurement(&self) -> SyncMeasurement {
        self.last
    }

    /// 最後に適用したタイミング
    pub fn active_mode(&self) -> Option<TimingMode> {
        self.active
    }

    /// 同期幅を測定し、変化があれば分類してタイミングレジスタを書き直す
    ///
    /// 読み取りに失敗した場合は履歴を更新せずにエラーを返します。
    pub fn poll<I2C, D>(&mut self, seq: &mut Sequencer<'_, I2C, D>) -> Result<Detection>
    where
        I2C: I2c,
        D: DelayNs,
    {
        let measurement = Self::measure(seq)?;

        if !measurement.high_bytes_differ(&self.last) {
            return Ok(Detection::Unchanged(measurement));
        }

        debug!(
            "0x9c~9f = {:x}, {:x}, {:x}, {:x}",
            measurement.hsync_high,
            measurement.hsync_low,
            measurement.vsync_high,
            measurement.vsync_low
        );

        let fallback = seq.config().output_mode.fallback_timing();
        let mode = classify(&measurement, fallback);
        seq.apply_video_timing(&mode.timing());
        info!("videoformat = {}", mode);

        self.last = measurement;
        self.active = Some(mode);

        seq.mipi_rx_logic_reset();

        Ok(Detection::Applied { mode, measurement })
    }

    fn measure<I2C, D>(seq: &mut Sequencer<'_, I2C, D>) -> Result<SyncMeasurement>
    where
        I2C: I2c,
        D: DelayNs,
    {
        let ch = seq.channel();
        Ok(SyncMeasurement {
            hsync_low: ch.read_byte(SubDevice::Main, regs::REG_HSYNC_L)?,
            hsync_high: ch.read_byte(SubDevice::Main, regs::REG_HSYNC_H)?,
            vsync_low: ch.read_byte(SubDevice::Main, regs::REG_VSYNC_L)?,
            vsync_high: ch.read_byte(SubDevice::Main, regs::REG_VSYNC_H)?,
        })
    }
}
