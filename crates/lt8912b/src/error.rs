use embedded_hal::{digital, i2c};
use lt8912b_core::ConfigError;

pub type Result<T> = core::result::Result<T, Error>;

/// LT8912B ドライバのエラー
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// probe時にサブデバイスが応答しない
    #[error("デバイスが見つかりません (addr=0x{address:02x})")]
    DeviceNotFound { address: u8 },

    /// リセットGPIOの操作に失敗
    #[error("リセットGPIOの設定に失敗しました (high={level}): {kind:?}")]
    Reset { level: bool, kind: digital::ErrorKind },

    /// レジスタ読み取りの転送エラー
    #[error("I2C転送エラー (addr=0x{address:02x}, reg=0x{register:02x}): {kind:?}")]
    Bus {
        address: u8,
        register: u8,
        kind: i2c::ErrorKind,
    },

    #[error("設定エラー: {0}")]
    InvalidConfig(#[from] ConfigError),
}
