use alloy::primitives::{Address, Bytes};

/// 单跳路径的字节长度：20 字节地址 + 3 字节费率 + 20 字节地址。
pub const SINGLE_HOP_PATH_LEN: usize = 20 + 3 + 20;

/// 编码集中流动性报价路径 `tokenIn ‖ fee(uint24, 大端) ‖ tokenOut`。
///
/// 超出 24 位的费率只保留低 3 字节。
pub fn encode_single_hop(token_in: Address, fee: u32, token_out: Address) -> Bytes {
    let mut path = Vec::with_capacity(SINGLE_HOP_PATH_LEN);
    path.extend_from_slice(token_in.as_slice());
    path.extend_from_slice(&fee.to_be_bytes()[1..]);
    path.extend_from_slice(token_out.as_slice());
    Bytes::from(path)
}
