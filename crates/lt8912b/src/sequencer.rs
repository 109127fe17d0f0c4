use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, error, info, warn};
use lt8912b_core::{
    AviInfoFrame, BridgeConfig, CpllCoefficients, PanelParameter, ScalerRatios, VideoTiming,
};

use crate::channel::RegisterChannel;
use crate::regs::{self, SubDevice};

/// MIPI RX / DDS リセットのアサート〜デアサート間の待機（ミリ秒）
pub const LOGIC_RESET_SETTLE_MS: u32 = 10;
/// スケーラーロック確認の最大回数
pub const SCALER_LOCK_ATTEMPTS: u8 = 5;
/// スケーラーロック確認の間隔（ミリ秒）
pub const SCALER_LOCK_INTERVAL_MS: u32 = 100;

/// スケーラーロック確認の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalerLock {
    /// ロック済み。`htotal` は測定されたトータル幅
    Locked { htotal: u16, attempts: u8 },
    /// 規定回数内にロックしなかった（設定はそのまま続行）
    TimedOut,
    /// パネルのアクティブ領域が0のため比率を計算できず、スケーラーを設定していない
    Skipped,
}

/// 初期化シーケンス
///
/// 各ステップは対象サブデバイスを指定して固定テーブルまたは計算値を書き込みます。
pub struct Sequencer<'a, I2C, D> {
    channel: &'a mut RegisterChannel<I2C, D>,
    config: &'a BridgeConfig,
}

impl<'a, I2C, D> Sequencer<'a, I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(channel: &'a mut RegisterChannel<I2C, D>, config: &'a BridgeConfig) -> Self {
        Self { channel, config }
    }

    pub fn config(&self) -> &BridgeConfig {
        self.config
    }

    pub fn channel(&mut self) -> &mut RegisterChannel<I2C, D> {
        &mut *self.channel
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.channel.delay_ms(ms);
    }

    /// チップIDを読み取ってログに出す。不一致でも続行する
    pub fn read_chip_id(&mut self) -> Option<[u8; 2]> {
        let id = self
            .channel
            .read_byte(SubDevice::Main, regs::REG_CHIP_ID_H)
            .and_then(|h| {
                self.channel
                    .read_byte(SubDevice::Main, regs::REG_CHIP_ID_L)
                    .map(|l| [h, l])
            });

        match id {
            Ok(id) => {
                info!("lt8912b id: 0x{:02x} 0x{:02x}", id[0], id[1]);
                if id != regs::CHIP_ID {
                    warn!(
                        "想定外のチップID (期待値: 0x{:02x} 0x{:02x})",
                        regs::CHIP_ID[0],
                        regs::CHIP_ID[1]
                    );
                }
                Some(id)
            }
            Err(e) => {
                warn!("チップIDの読み取りに失敗: {}", e);
                None
            }
        }
    }

    pub fn digital_clock_enable(&mut self) {
        self.channel
            .write_table(SubDevice::Main, &regs::DIGITAL_CLOCK_ENABLE);
    }

    pub fn tx_analog(&mut self) {
        self.channel.write_table(SubDevice::Main, &regs::TX_ANALOG);
    }

    pub fn cbus_analog(&mut self) {
        self.channel
            .write_table(SubDevice::Main, &regs::CBUS_ANALOG);
    }

    pub fn hdmi_pll_analog(&mut self) {
        self.channel
            .write_table(SubDevice::Main, &regs::HDMI_PLL_ANALOG);
    }

    pub fn mipi_analog(&mut self) {
        let writes = regs::mipi_analog_writes(self.config.pn_swap);
        self.channel.write_table(SubDevice::Main, &writes);
    }

    pub fn mipi_basic_set(&mut self) {
        let writes = regs::mipi_basic_writes(self.config);
        if self.config.lane_swap {
            debug!("mipi basic set: lane swap 3210, {}", self.config.mipi_lanes);
        }
        self.channel.write_table(SubDevice::CecDsi, &writes);
    }

    pub fn dds_config(&mut self) {
        self.channel
            .write_table(SubDevice::CecDsi, &regs::DDS_CONFIG);
    }

    /// MIPIビデオタイミングレジスタを書き込む。書き込み後は `mipi_rx_logic_reset` が必要
    pub fn apply_video_timing(&mut self, timing: &VideoTiming) {
        let writes = regs::video_timing_writes(timing);
        self.channel.write_table(SubDevice::CecDsi, &writes);
    }

    /// MIPI RX と DDS のロジックリセット
    pub fn mipi_rx_logic_reset(&mut self) {
        let main = SubDevice::Main;
        self.channel.write_byte(main, regs::REG_MIPI_RX_RESET, 0x7f);
        self.channel.delay_ms(LOGIC_RESET_SETTLE_MS);
        self.channel.write_byte(main, regs::REG_MIPI_RX_RESET, 0xff);

        self.channel.write_byte(main, regs::REG_DDS_RESET, 0xfb);
        self.channel.delay_ms(LOGIC_RESET_SETTLE_MS);
        self.channel.write_byte(main, regs::REG_DDS_RESET, 0xff);
    }

    /// 48kHz / 64fs の I2S 入力を有効化（オーディオシンクの有無に関わらず設定）
    pub fn audio_iis_enable(&mut self) {
        self.channel
            .write_table(SubDevice::Main, &regs::AUDIO_IIS_MAIN);
        self.channel
            .write_table(SubDevice::Audio, &regs::AUDIO_IIS_AUDIO);
    }

    /// ヌルパケットと出力モードに応じた AVI インフォフレーム
    pub fn avi_info_frame(&mut self) {
        let frame = AviInfoFrame::for_mode(self.config.output_mode);
        debug_assert!(frame.checksum_is_valid());

        let null = regs::NULL_PACKET_ENABLE;
        self.channel
            .write_byte(SubDevice::Audio, null.reg, null.value);

        // 同期極性
        self.channel
            .write_byte(SubDevice::Main, 0xab, frame.sync_polarity);

        let audio = SubDevice::Audio;
        self.channel.write_byte(audio, 0x43, frame.checksum);
        self.channel.write_byte(audio, 0x44, frame.pb1);
        self.channel.write_byte(audio, 0x45, frame.pb2);
        self.channel.write_byte(audio, 0x46, frame.pb3);
        self.channel.write_byte(audio, 0x47, frame.vic);
    }

    pub fn lvds_power_up(&mut self) {
        self.channel
            .write_table(SubDevice::Main, &regs::LVDS_POWER_UP);
    }

    pub fn lvds_bypass(&mut self) {
        self.channel
            .write_table(SubDevice::Main, &regs::LVDS_BYPASS);
    }

    pub fn core_pll_setup(&mut self, panel: &PanelParameter) -> CpllCoefficients {
        let coeffs = CpllCoefficients::from_pixel_clock(panel.pclk_khz);
        debug!(
            "cpll m={} k1=0x{:02x} k2=0x{:02x} ({} kHz)",
            coeffs.m, coeffs.k1, coeffs.k2, panel.pclk_khz
        );
        self.channel
            .write_table(SubDevice::Main, &regs::core_pll_writes(&coeffs));
        coeffs
    }

    /// スケーラー設定後、ロック状態を最大 `SCALER_LOCK_ATTEMPTS` 回確認する
    pub fn scaler_setup(&mut self, input: &VideoTiming, panel: &PanelParameter) -> ScalerLock {
        let Some(ratios) = ScalerRatios::compute(input, panel) else {
            error!(
                "パネルのアクティブ領域が不正です ({}x{})",
                panel.hact, panel.vact
            );
            return ScalerLock::Skipped;
        };

        let writes = regs::scaler_writes(input, panel, &ratios);
        self.channel.write_table(SubDevice::Main, &writes);

        for attempt in 1..=SCALER_LOCK_ATTEMPTS {
            if let Some(htotal) = self.scaler_locked_htotal() {
                debug!("scaler setup htotal = {}", htotal);
                return ScalerLock::Locked {
                    htotal,
                    attempts: attempt,
                };
            }
            debug!("scaler loop {}", attempt);
            self.channel.delay_ms(SCALER_LOCK_INTERVAL_MS);
        }

        warn!(
            "スケーラーがロックしませんでした ({}回確認)",
            SCALER_LOCK_ATTEMPTS
        );
        ScalerLock::TimedOut
    }

    fn scaler_locked_htotal(&mut self) -> Option<u16> {
        let main = SubDevice::Main;
        let ch = &mut *self.channel;
        let status = ch.read_byte(main, regs::REG_SCALER_STATUS).ok()?;
        if status & regs::SCALER_LOCK_MASK == 0 {
            return None;
        }
        let high = ch.read_byte(main, regs::REG_SCALER_STATUS).ok()? & 0x0f;
        let low = ch.read_byte(main, regs::REG_SCALER_HTOTAL_L).ok()?;
        Some(high as u16 * 0x100 + low as u16)
    }

    /// LVDS 出力経路（バイパス、またはコアPLL + スケーラー）
    pub fn lvds_output_cfg(&mut self, input: &VideoTiming) -> Option<ScalerLock> {
        self.lvds_power_up();
        if self.config.lvds_bypass {
            self.lvds_bypass();
            None
        } else {
            let panel = self.config.lvds_panel.parameter();
            self.core_pll_setup(&panel);
            Some(self.scaler_setup(input, &panel))
        }
    }

    pub fn lvds_output(&mut self, on: bool) {
        if on {
            self.channel
                .write_table(SubDevice::Main, &regs::LVDS_OUTPUT_ON);
            debug!("lt8912b lvds output enable");
        } else {
            self.channel.write_byte(
                SubDevice::Main,
                regs::REG_LVDS_POWER,
                regs::LVDS_OUTPUT_OFF,
            );
        }
    }

    pub fn hdmi_output(&mut self, on: bool) {
        let value = if on {
            regs::HDMI_OUTPUT_ON
        } else {
            regs::HDMI_OUTPUT_OFF
        };
        self.channel
            .write_byte(SubDevice::Main, regs::REG_HDMI_OUTPUT, value);
    }

    /// HPD（bit7）。読み取り失敗時は未接続として扱う
    pub fn hot_plug_detected(&mut self) -> bool {
        let main = SubDevice::Main;
        match self.channel.read_byte(main, regs::REG_HPD_STATUS) {
            Ok(status) => status & regs::HPD_MASK == regs::HPD_MASK,
            Err(e) => {
                warn!("HPD状態の読み取りに失敗、未接続として扱います: {}", e);
                false
            }
        }
    }

    pub fn enter_suspend(&mut self) {
        self.channel
            .write_table(SubDevice::Main, &regs::SUSPEND_ENTER);
    }

    pub fn exit_suspend(&mut self) {
        self.channel
            .write_table(SubDevice::Main, &regs::SUSPEND_EXIT);
        self.channel.delay_ms(LOGIC_RESET_SETTLE_MS);
        self.mipi_rx_logic_reset();
    }
}
