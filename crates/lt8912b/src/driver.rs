use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin};
use embedded_hal::i2c::I2c;
use log::{debug, error, info, warn};
use lt8912b_core::{BridgeConfig, DisplayTiming, DsiLink, TimingMode, VideoTiming};

use crate::channel::RegisterChannel;
use crate::detector::{Detection, TimingDetector};
use crate::error::{Error, Result};
use crate::regs::SubDevice;
use crate::sequencer::{ScalerLock, Sequencer};
use crate::suspend::{SuspendLatch, SuspendState};

/// リセットパルス幅（ミリ秒）
pub const RESET_PULSE_MS: u32 = 200;
/// 初期化シーケンス末尾の安定待ち（ミリ秒）
pub const SETUP_SETTLE_MS: u32 = 1000;

/// LT8912B ドライバ
///
/// I2Cバス、リセットGPIO、遅延を所有し、検出履歴とサスペンド状態を保持します。
pub struct Lt8912b<I2C, RST, D> {
    channel: RegisterChannel<I2C, D>,
    reset: RST,
    config: BridgeConfig,
    detector: TimingDetector,
    suspend: SuspendLatch,
    scaler: Option<ScalerLock>,
    hdmi_enabled: bool,
    lvds_enabled: bool,
}

impl<I2C, RST, D> Lt8912b<I2C, RST, D>
where
    I2C: I2c,
    RST: OutputPin,
    D: DelayNs,
{
    pub fn new(i2c: I2C, reset: RST, delay: D, config: BridgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            channel: RegisterChannel::new(i2c, delay),
            reset,
            config,
            detector: TimingDetector::new(),
            suspend: SuspendLatch::new(),
            scaler: None,
            hdmi_enabled: false,
            lvds_enabled: false,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// リセット → 3つのサブデバイスの応答確認 → 初期化シーケンス
    ///
    /// どれか1つでも応答しなければ `Error::DeviceNotFound` を返し、レジスタには何も書き込みません。
    pub fn probe(&mut self) -> Result<()> {
        debug!("lt8912b probe");

        self.reset()?;

        for dev in SubDevice::ALL {
            self.channel.probe(dev).inspect_err(|_| {
                error!("Can't find device id=0x{:x}", dev.address());
            })?;
        }

        self.setup();
        Ok(())
    }

    /// リセットGPIOを High → 200ms → Low
    pub fn reset(&mut self) -> Result<()> {
        self.reset.set_high().map_err(|e| {
            error!("reset gpio fails to set true");
            Error::Reset {
                level: true,
                kind: e.kind(),
            }
        })?;
        self.channel.delay_ms(RESET_PULSE_MS);
        self.reset.set_low().map_err(|e| {
            error!("reset gpio fails to set false");
            Error::Reset {
                level: false,
                kind: e.kind(),
            }
        })?;
        Ok(())
    }

    /// 初期化シーケンス全体。全てテーブルの再生なので再実行しても安全
    pub fn setup(&mut self) {
        let mut seq = Sequencer::new(&mut self.channel, &self.config);

        seq.read_chip_id();

        seq.digital_clock_enable();
        seq.tx_analog();
        seq.cbus_analog();
        seq.hdmi_pll_analog();
        seq.mipi_analog();
        seq.mipi_basic_set();
        seq.dds_config();

        poll_logged(&mut self.detector, &mut seq);

        seq.audio_iis_enable();
        seq.avi_info_frame();
        seq.mipi_rx_logic_reset();

        let input: VideoTiming = match self.detector.active_mode() {
            Some(mode) => mode.timing(),
            None => self.config.lvds_panel.parameter().into(),
        };
        self.scaler = seq.lvds_output_cfg(&input);

        seq.lvds_output(true);
        self.lvds_enabled = true;

        if seq.hot_plug_detected() {
            seq.hdmi_output(true);
            self.hdmi_enabled = true;
            info!("lt8912b_get_hpd: high, HDMI出力を有効化");
        } else {
            info!("lt8912b_get_hpd: low, HDMI出力は無効のまま");
        }

        poll_logged(&mut self.detector, &mut seq);
        seq.delay_ms(SETUP_SETTLE_MS);

        self.suspend.exit(&mut seq);
    }

    /// 入力タイミングを検出し、変化していれば再設定する
    pub fn detect(&mut self) -> Result<Detection> {
        let mut seq = Sequencer::new(&mut self.channel, &self.config);
        self.detector.poll(&mut seq)
    }

    /// HPD状態（副作用なし）
    pub fn hot_plug_detected(&mut self) -> bool {
        let mut seq = Sequencer::new(&mut self.channel, &self.config);
        seq.hot_plug_detected()
    }

    pub fn set_hdmi_output(&mut self, on: bool) {
        let mut seq = Sequencer::new(&mut self.channel, &self.config);
        seq.hdmi_output(on);
        self.hdmi_enabled = on;
    }

    pub fn set_lvds_output(&mut self, on: bool) {
        let mut seq = Sequencer::new(&mut self.channel, &self.config);
        seq.lvds_output(on);
        self.lvds_enabled = on;
    }

    /// サスペンドへ移行。既にサスペンド中なら何もしない
    pub fn suspend(&mut self) -> bool {
        let mut seq = Sequencer::new(&mut self.channel, &self.config);
        self.suspend.enter(&mut seq)
    }

    /// サスペンドから復帰。既にアクティブなら何もしない
    pub fn resume(&mut self) -> bool {
        let mut seq = Sequencer::new(&mut self.channel, &self.config);
        self.suspend.exit(&mut seq)
    }

    /// 表示フレームワーク向けのタイミング記述子とDSIリンク情報
    pub fn display_timing(&self) -> (DisplayTiming, DsiLink) {
        (
            DisplayTiming::for_output(self.config.output_mode),
            DsiLink::for_config(&self.config),
        )
    }

    /// バックライトはこのチップでは制御しない
    pub fn enable_backlight(&mut self) -> Result<()> {
        Ok(())
    }

    pub fn suspend_state(&self) -> SuspendState {
        self.suspend.state()
    }

    pub fn active_mode(&self) -> Option<TimingMode> {
        self.detector.active_mode()
    }

    /// 直近のスケーラー設定結果（バイパス時は `None`）
    pub fn scaler_lock(&self) -> Option<ScalerLock> {
        self.scaler
    }

    pub fn is_hdmi_enabled(&self) -> bool {
        self.hdmi_enabled
    }

    pub fn is_lvds_enabled(&self) -> bool {
        self.lvds_enabled
    }

    pub fn write_failures(&self) -> u32 {
        self.channel.write_failures()
    }

    pub fn release(self) -> (I2C, RST, D) {
        let (i2c, delay) = self.channel.release();
        (i2c, self.reset, delay)
    }
}

/// 初期化中の検出。読み取りエラーはログのみで続行する
fn poll_logged<I2C, D>(detector: &mut TimingDetector, seq: &mut Sequencer<'_, I2C, D>)
where
    I2C: I2c,
    D: DelayNs,
{
    if let Err(e) = detector.poll(seq) {
        warn!("入力タイミングの検出に失敗: {}", e);
    }
}
