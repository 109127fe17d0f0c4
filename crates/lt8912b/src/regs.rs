//! LT8912B のサブデバイスアドレスとレジスタテーブル
//!
//! テーブル内の順序には意味があります（後の書き込みが先にラッチされた状態に依存する）。

use lt8912b_core::{BridgeConfig, CpllCoefficients, PanelParameter, ScalerRatios, VideoTiming};

/// 単一レジスタへの書き込み
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegWrite {
    pub reg: u8,
    pub value: u8,
}

const fn w(reg: u8, value: u8) -> RegWrite {
    RegWrite { reg, value }
}

/// チップ内部の3つのI2Cモジュール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubDevice {
    /// 0x48: クロック、アナログ、LVDS、スケーラー、HDMI出力制御
    Main,
    /// 0x49: MIPI受信、DDS
    CecDsi,
    /// 0x4a: AVIパケット、オーディオ
    Audio,
}

impl SubDevice {
    pub const ALL: [SubDevice; 3] = [SubDevice::Main, SubDevice::CecDsi, SubDevice::Audio];

    pub const fn address(self) -> u8 {
        match self {
            SubDevice::Main => 0x48,
            SubDevice::CecDsi => 0x49,
            SubDevice::Audio => 0x4a,
        }
    }
}

// チップID（メインデバイス 0x00 / 0x01）
pub const REG_CHIP_ID_H: u8 = 0x00;
pub const REG_CHIP_ID_L: u8 = 0x01;
pub const CHIP_ID: [u8; 2] = [0x12, 0xB2];

// 同期幅測定（メインデバイス）
pub const REG_HSYNC_L: u8 = 0x9c;
pub const REG_HSYNC_H: u8 = 0x9d;
pub const REG_VSYNC_L: u8 = 0x9e;
pub const REG_VSYNC_H: u8 = 0x9f;

// HPD状態（bit7）
pub const REG_HPD_STATUS: u8 = 0xc1;
pub const HPD_MASK: u8 = 0x80;

// スケーラー状態
pub const REG_SCALER_STATUS: u8 = 0xa7;
pub const REG_SCALER_HTOTAL_L: u8 = 0xa6;
pub const SCALER_LOCK_MASK: u8 = 0x20;

// 出力制御
pub const REG_HDMI_OUTPUT: u8 = 0x33;
pub const HDMI_OUTPUT_ON: u8 = 0x0e;
pub const HDMI_OUTPUT_OFF: u8 = 0x0c;
pub const REG_LVDS_POWER: u8 = 0x44;
pub const LVDS_OUTPUT_OFF: u8 = 0x31;

// MIPI RX / DDS リセット
pub const REG_MIPI_RX_RESET: u8 = 0x03;
pub const REG_DDS_RESET: u8 = 0x05;

pub const DIGITAL_CLOCK_ENABLE: [RegWrite; 6] = [
    w(0x02, 0xf7),
    w(0x08, 0xff),
    w(0x09, 0xff),
    w(0x0a, 0xff),
    w(0x0b, 0x7c),
    w(0x0c, 0xff),
];

pub const TX_ANALOG: [RegWrite; 6] = [
    w(0x31, 0xe1),
    w(0x32, 0xe1),
    w(0x33, 0x0c),
    w(0x37, 0x00),
    w(0x38, 0x22),
    w(0x60, 0x82),
];

pub const CBUS_ANALOG: [RegWrite; 3] = [w(0x39, 0x45), w(0x3a, 0x00), w(0x3b, 0x00)];

pub const HDMI_PLL_ANALOG: [RegWrite; 4] = [
    w(0x44, 0x31),
    w(0x55, 0x44),
    w(0x57, 0x01),
    w(0x5a, 0x02),
];

/// DDS設定（基準クロック前提の事前計算値）
pub const DDS_CONFIG: [RegWrite; 45] = [
    w(0x4e, 0xaa),
    w(0x4f, 0xaa),
    w(0x50, 0x6a),
    w(0x51, 0x80),
    w(0x1e, 0x4f),
    w(0x1f, 0x5e),
    w(0x20, 0x01),
    w(0x21, 0x2c),
    w(0x22, 0x01),
    w(0x23, 0xfa),
    w(0x24, 0x00),
    w(0x25, 0xc8),
    w(0x26, 0x00),
    w(0x27, 0x5e),
    w(0x28, 0x01),
    w(0x29, 0x2c),
    w(0x2a, 0x01),
    w(0x2b, 0xfa),
    w(0x2c, 0x00),
    w(0x2d, 0xc8),
    w(0x2e, 0x00),
    w(0x42, 0x64),
    w(0x43, 0x00),
    w(0x44, 0x04),
    w(0x45, 0x00),
    w(0x46, 0x59),
    w(0x47, 0x00),
    w(0x48, 0xf2),
    w(0x49, 0x06),
    w(0x4a, 0x00),
    w(0x4b, 0x72),
    w(0x4c, 0x45),
    w(0x4d, 0x00),
    w(0x52, 0x08),
    w(0x53, 0x00),
    w(0x54, 0xb2),
    w(0x55, 0x00),
    w(0x56, 0xe4),
    w(0x57, 0x0d),
    w(0x58, 0x00),
    w(0x59, 0xe4),
    w(0x5a, 0x8a),
    w(0x5b, 0x00),
    w(0x5c, 0x34),
    w(0x51, 0x00),
];

pub const LVDS_POWER_UP: [RegWrite; 2] = [w(0x44, 0x30), w(0x51, 0x05)];

pub const LVDS_BYPASS: [RegWrite; 12] = [
    w(0x50, 0x24),
    w(0x51, 0x2d),
    w(0x52, 0x04),
    w(0x69, 0x0e),
    w(0x69, 0x8e),
    w(0x6a, 0x00),
    w(0x6c, 0xb8),
    w(0x6b, 0x51),
    w(0x04, 0xfb),
    w(0x04, 0xff),
    w(0x7f, 0x00),
    w(0xa8, 0x13),
];

pub const LVDS_OUTPUT_ON: [RegWrite; 6] = [
    w(0x02, 0xf7),
    w(0x02, 0xff),
    w(0x03, 0xcb),
    w(0x03, 0xfb),
    w(0x03, 0xff),
    w(0x44, 0x30),
];

/// 48kHz サンプリング, SCLK = 64fs
pub const AUDIO_IIS_MAIN: [RegWrite; 1] = [w(0xb2, 0x01)];
pub const AUDIO_IIS_AUDIO: [RegWrite; 3] = [
    // 0xE2: 32FS, 0xD2: 64FS
    w(0x06, 0x08),
    w(0x07, 0xf0),
    w(0x34, 0xd2),
];

/// ヌルパケット有効化（オーディオデバイス）
pub const NULL_PACKET_ENABLE: RegWrite = w(0x3c, 0x41);

/// サスペンド移行（9mA、HPD検出は動作継続）
pub const SUSPEND_ENTER: [RegWrite; 5] = [
    w(0x54, 0x1d),
    w(0x51, 0x15),
    w(0x44, 0x31),
    w(0x41, 0xbd),
    w(0x5c, 0x11),
];

pub const SUSPEND_EXIT: [RegWrite; 5] = [
    w(0x5c, 0x10),
    w(0x54, 0x1c),
    w(0x51, 0x2d),
    w(0x44, 0x30),
    w(0x41, 0xbc),
];

fn lo(v: u16) -> u8 {
    (v % 256) as u8
}

fn hi(v: u16) -> u8 {
    (v / 256) as u8
}

/// MIPI受信アナログ設定（メインデバイス）
pub fn mipi_analog_writes(pn_swap: bool) -> [RegWrite; 3] {
    // リファレンスデザイン通りの配線ならP/N入れ替えは不要
    let pn = if pn_swap { 0xf6 } else { 0xd6 };
    [w(0x3e, pn), w(0x3f, 0xd4), w(0x41, 0x3c)]
}

/// MIPI基本設定（CEC/DSIデバイス）
pub fn mipi_basic_writes(config: &BridgeConfig) -> [RegWrite; 7] {
    let swap = if config.lane_swap { 0xa8 } else { 0x00 };
    [
        // term en
        w(0x10, 0x01),
        // settle
        w(0x11, 0x05),
        w(0x13, config.lane_register_value()),
        // debug mux
        w(0x14, 0x00),
        // 3210 / 0123
        w(0x15, swap),
        // hshift 3
        w(0x1a, 0x03),
        // vshift 3
        w(0x1b, 0x03),
    ]
}

/// MIPIビデオタイミング（CEC/DSIデバイス）
pub fn video_timing_writes(t: &VideoTiming) -> [RegWrite; 17] {
    [
        w(0x18, lo(t.hs)),
        w(0x19, lo(t.vs)),
        w(0x1c, lo(t.hact)),
        w(0x1d, hi(t.hact)),
        // fifo_buff_length 12
        w(0x2f, 0x0c),
        w(0x34, lo(t.htotal)),
        w(0x35, hi(t.htotal)),
        w(0x36, lo(t.vtotal)),
        w(0x37, hi(t.vtotal)),
        w(0x38, lo(t.vbp)),
        w(0x39, hi(t.vbp)),
        w(0x3a, lo(t.vfp)),
        w(0x3b, hi(t.vfp)),
        w(0x3c, lo(t.hbp)),
        w(0x3d, hi(t.hbp)),
        w(0x3e, lo(t.hfp)),
        w(0x3f, hi(t.hfp)),
    ]
}

/// コアPLL設定（メインデバイス）
pub fn core_pll_writes(c: &CpllCoefficients) -> [RegWrite; 9] {
    [
        // cp=50uA
        w(0x50, 0x24),
        // xtal_clk基準、2次パッシブLPF
        w(0x51, 0x05),
        w(0x52, 0x14),
        // CP_PRESET_DIV_RATIO
        w(0x69, c.m),
        w(0x69, c.m | 0x80),
        // RGD_CP_SOFT_K_EN, RGD_CP_SOFT_K[13:8]
        w(0x6c, c.k2 | 0x80),
        w(0x6b, c.k1),
        // core pll reset
        w(0x04, 0xfb),
        w(0x04, 0xff),
    ]
}

/// スケーラー設定（メインデバイス）。末尾の 0x7f=0xb0 でスケーラーを起動する
pub fn scaler_writes(
    input: &VideoTiming,
    panel: &PanelParameter,
    ratios: &ScalerRatios,
) -> [RegWrite; 26] {
    let packed_active = hi(panel.vact)
        .wrapping_mul(16)
        .wrapping_add(hi(panel.hact));
    [
        w(0x80, 0x00),
        w(0x81, 0xff),
        w(0x82, 0x03),
        w(0x83, lo(input.hact)),
        w(0x84, hi(input.hact)),
        w(0x85, 0x80),
        w(0x86, 0x10),
        w(0x87, lo(panel.htotal)),
        w(0x88, hi(panel.htotal)),
        w(0x89, lo(panel.hs)),
        w(0x8a, lo(panel.hbp)),
        w(0x8b, lo(panel.vs)),
        w(0x8c, lo(panel.hact)),
        w(0x8d, lo(panel.vact)),
        w(0x8e, packed_active),
        w(0x8f, (ratios.h_ratio % 256) as u8),
        w(0x90, (ratios.h_ratio / 256) as u8),
        w(0x91, (ratios.v_ratio % 256) as u8),
        w(0x92, (ratios.v_ratio / 256) as u8),
        w(0x7f, 0x96),
        w(0xa8, 0x13),
        // lvds pll reset
        w(0x02, 0xf7),
        w(0x02, 0xff),
        // scaler reset
        w(0x03, 0xcf),
        w(0x03, 0xff),
        w(0x7f, 0xb0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lt8912b_core::TimingMode;

    #[test]
    fn test_subdevice_addresses() {
        let addrs: Vec<u8> = SubDevice::ALL.iter().map(|d| d.address()).collect();
        assert_eq!(addrs, vec![0x48, 0x49, 0x4a]);
    }

    #[test]
    fn test_video_timing_byte_split() {
        let writes = video_timing_writes(&TimingMode::FullHd1080p60.timing());
        // hact 1920 = 0x0780, htotal 2200 = 0x0898, vtotal 1125 = 0x0465
        assert_eq!(writes[2], w(0x1c, 0x80));
        assert_eq!(writes[3], w(0x1d, 0x07));
        assert_eq!(writes[5], w(0x34, 0x98));
        assert_eq!(writes[6], w(0x35, 0x08));
        assert_eq!(writes[7], w(0x36, 0x65));
        assert_eq!(writes[8], w(0x37, 0x04));
        assert_eq!(writes[16], w(0x3f, 0x00));
    }

    #[test]
    fn test_core_pll_writes_for_lvds_panel() {
        let c = CpllCoefficients::from_pixel_clock(65_000);
        let writes = core_pll_writes(&c);
        assert_eq!(writes[3], w(0x69, 18));
        assert_eq!(writes[4], w(0x69, 18 | 0x80));
        assert_eq!(writes[5], w(0x6c, 0x0c | 0x80));
        assert_eq!(writes[6], w(0x6b, 0xcc));
    }

    #[test]
    fn test_scaler_packed_active_nibbles() {
        let input = TimingMode::Hd720p60.timing();
        let panel = TimingMode::Panel1024x600.panel();
        let ratios = ScalerRatios::compute(&input, &panel).unwrap();
        let writes = scaler_writes(&input, &panel, &ratios);
        // vact 600 -> 0x02, hact 1024 -> 0x04
        assert_eq!(writes[14], w(0x8e, 0x24));
        // h_ratio = 5120 = 0x1400
        assert_eq!(writes[15], w(0x8f, 0x00));
        assert_eq!(writes[16], w(0x90, 0x14));
    }

    #[test]
    fn test_lane_options() {
        let mut config = BridgeConfig::default();
        config.lane_swap = true;
        config.mipi_lanes = 2;
        let writes = mipi_basic_writes(&config);
        assert_eq!(writes[2], w(0x13, 2));
        assert_eq!(writes[4], w(0x15, 0xa8));
        assert_eq!(mipi_analog_writes(true)[0], w(0x3e, 0xf6));
        assert_eq!(mipi_analog_writes(false)[0], w(0x3e, 0xd6));
    }
}
