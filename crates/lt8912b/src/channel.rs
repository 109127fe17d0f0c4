use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::regs::{RegWrite, SubDevice};

/// 書き込み毎の待機時間（ミリ秒）。待機なしで連続書き込みするとロックしないことがある
pub const WRITE_SETTLE_MS: u32 = 1;

/// サブデバイス指定付きのレジスタチャネル
///
/// 物理的には1本のI2Cバスを3つのアドレスで共有します。
/// 対象サブデバイスは毎回の呼び出しで明示的に指定します。
pub struct RegisterChannel<I2C, D> {
    i2c: I2C,
    delay: D,
    write_failures: u32,
}

impl<I2C, D> RegisterChannel<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            write_failures: 0,
        }
    }

    /// サブデバイスが応答するか確認する（0バイト書き込み）
    pub fn probe(&mut self, dev: SubDevice) -> Result<()> {
        let address = dev.address();
        self.i2c.write(address, &[]).map_err(|e| {
            debug!("probe失敗 addr=0x{:02x}: {:?}", address, e.kind());
            Error::DeviceNotFound { address }
        })
    }

    /// 1バイト書き込み後に `WRITE_SETTLE_MS` 待機する
    ///
    /// 転送エラーはログに残して無視します（リトライなし）。
    pub fn write_byte(&mut self, dev: SubDevice, reg: u8, value: u8) {
        debug!("write 0x{:02x}: {:02x} {:02x}", dev.address(), reg, value);
        if let Err(e) = self.i2c.write(dev.address(), &[reg, value]) {
            self.write_failures = self.write_failures.saturating_add(1);
            warn!(
                "レジスタ書き込み失敗 addr=0x{:02x} reg=0x{:02x}: {:?}",
                dev.address(),
                reg,
                e.kind()
            );
        }
        self.delay.delay_ms(WRITE_SETTLE_MS);
    }

    /// 1バイト読み取り。転送エラーは `Error::Bus` として返す
    pub fn read_byte(&mut self, dev: SubDevice, reg: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(dev.address(), &[reg], &mut buf)
            .map_err(|e| Error::Bus {
                address: dev.address(),
                register: reg,
                kind: e.kind(),
            })?;
        Ok(buf[0])
    }

    /// テーブルを宣言順に書き込む
    pub fn write_table(&mut self, dev: SubDevice, table: &[RegWrite]) {
        debug!("regs num {} (addr=0x{:02x})", table.len(), dev.address());
        for entry in table {
            self.write_byte(dev, entry.reg, entry.value);
        }
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// これまでに無視した書き込みエラーの数
    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}
