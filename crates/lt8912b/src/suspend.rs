use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::info;

use crate::sequencer::Sequencer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SuspendState {
    #[default]
    Active,
    Suspended,
}

/// サスペンド状態のラッチ
///
/// 既に目的の状態にある場合はレジスタを書き込みません（出力のグリッチ防止）。
#[derive(Debug, Default)]
pub struct SuspendLatch {
    state: SuspendState,
}

impl SuspendLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SuspendState {
        self.state
    }

    /// Active → Suspended。状態が変化した場合は `true`
    pub fn enter<I2C, D>(&mut self, seq: &mut Sequencer<'_, I2C, D>) -> bool
    where
        I2C: I2c,
        D: DelayNs,
    {
        if self.state == SuspendState::Suspended {
            return false;
        }
        seq.enter_suspend();
        self.state = SuspendState::Suspended;
        info!("suspend on");
        true
    }

    /// Suspended → Active（MIPI RX ロジックリセットを含む）。状態が変化した場合は `true`
    pub fn exit<I2C, D>(&mut self, seq: &mut Sequencer<'_, I2C, D>) -> bool
    where
        I2C: I2c,
        D: DelayNs,
    {
        if self.state == SuspendState::Active {
            return false;
        }
        seq.exit_suspend();
        self.state = SuspendState::Active;
        info!("suspend off");
        true
    }
}
