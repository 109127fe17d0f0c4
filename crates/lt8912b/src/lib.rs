/*!
 * # LT8912B Driver
 *
 * Lontium LT8912B (MIPI-DSI → HDMI/LVDS ブリッジ) の embedded-hal ドライバ
 *
 * ## モジュール構成
 * - `regs`: サブデバイスアドレスとレジスタテーブル
 * - `channel`: サブデバイス指定付きのレジスタ読み書き（書き込み毎に1ms待機）
 * - `sequencer`: 初期化シーケンス（クロック → アナログ → PLL/DDS → レーン → 出力）
 * - `detector`: 入力同期幅の測定とタイミング再設定
 * - `suspend`: サスペンド状態ラッチ
 * - `driver`: 表示フレームワーク向けのファサード（probe / タイミング取得）
 * - `monitor`: 定期監視の1周期（タイミング再検出と HPD による HDMI 切り替え）
 */

pub mod channel;
pub mod detector;
pub mod driver;
pub mod error;
pub mod monitor;
pub mod regs;
pub mod sequencer;
pub mod suspend;

pub use channel::RegisterChannel;
pub use detector::{Detection, TimingDetector};
pub use driver::Lt8912b;
pub use error::{Error, Result};
pub use monitor::HdmiAction;
pub use regs::{RegWrite, SubDevice};
pub use sequencer::{ScalerLock, Sequencer};
pub use suspend::{SuspendLatch, SuspendState};
