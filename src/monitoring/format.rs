use std::borrow::Cow;

use alloy::primitives::{Address, address};

const WBNB: Address = address!("0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c");
const WETH: Address = address!("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

/// 日志里的代币地址缩写，常见包装币直接显示符号。
pub fn short_token(token: &Address) -> Cow<'static, str> {
    if *token == WBNB {
        return Cow::Borrowed("WBNB");
    }
    if *token == WETH {
        return Cow::Borrowed("WETH");
    }
    let full = token.to_string();
    Cow::Owned(format!("{}..{}", &full[..6], &full[full.len() - 4..]))
}
