use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::detector::Detection;
use crate::driver::Lt8912b;

/// HPD の変化に対する HDMI 出力の切り替え
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HdmiAction {
    Enable,
    Disable,
}

/// HPD と現在の出力状態から次の操作を決める（変化なしなら `None`）
pub fn hdmi_action(hpd: bool, hdmi_enabled: bool) -> Option<HdmiAction> {
    match (hpd, hdmi_enabled) {
        (true, false) => Some(HdmiAction::Enable),
        (false, true) => Some(HdmiAction::Disable),
        _ => None,
    }
}

/// 監視ループの1周期: 入力タイミング検出と（有効なら）HPD 再確認
///
/// 検出エラーはログのみで、HPD の確認は続行します。実行した HDMI 操作を返します。
pub fn tick<I2C, RST, D>(bridge: &mut Lt8912b<I2C, RST, D>, hpd_recheck: bool) -> Option<HdmiAction>
where
    I2C: I2c,
    RST: OutputPin,
    D: DelayNs,
{
    match bridge.detect() {
        Ok(Detection::Applied { mode, .. }) => info!("入力タイミングを再設定しました: {}", mode),
        Ok(Detection::Unchanged(_)) => {}
        Err(e) => warn!("入力タイミングの検出に失敗: {}", e),
    }

    if !hpd_recheck {
        return None;
    }

    let hpd = bridge.hot_plug_detected();
    let action = hdmi_action(hpd, bridge.is_hdmi_enabled())?;
    match action {
        HdmiAction::Enable => {
            info!("HDMIシンクが接続されました");
            bridge.set_hdmi_output(true);
        }
        HdmiAction::Disable => {
            info!("HDMIシンクが切断されました");
            bridge.set_hdmi_output(false);
        }
    }
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hdmi_action_on_edges() {
        assert_eq!(hdmi_action(true, false), Some(HdmiAction::Enable));
        assert_eq!(hdmi_action(false, true), Some(HdmiAction::Disable));
    }

    #[test]
    fn test_hdmi_action_steady_state() {
        assert_eq!(hdmi_action(true, true), None);
        assert_eq!(hdmi_action(false, false), None);
    }
}
