use std::fmt;
use std::sync::Arc;

use alloy::primitives::{Address, hex};
use alloy::signers::local::PrivateKeySigner;
use zeroize::Zeroizing;

use super::error::{EngineError, EngineResult};

#[derive(Clone)]
enum KeyState {
    Missing,
    Invalid(String),
    Ready(Arc<PrivateKeySigner>),
}

/// 进程级签名身份。私钥缺失或无法解析时不阻止启动，只让需要签名的请求失败。
#[derive(Clone)]
pub struct SignerIdentity {
    state: KeyState,
}

impl SignerIdentity {
    pub fn missing() -> Self {
        Self {
            state: KeyState::Missing,
        }
    }

    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        Self {
            state: KeyState::Ready(Arc::new(signer)),
        }
    }

    /// 解析十六进制私钥（允许 `0x` 前缀）；空字符串视为未配置。
    pub fn from_private_key(raw: &Zeroizing<String>) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::missing();
        }
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let state = match hex::decode(digits) {
            Ok(bytes) => {
                let bytes = Zeroizing::new(bytes);
                match PrivateKeySigner::from_slice(&bytes) {
                    Ok(signer) => KeyState::Ready(Arc::new(signer)),
                    Err(err) => KeyState::Invalid(err.to_string()),
                }
            }
            Err(err) => KeyState::Invalid(err.to_string()),
        };
        Self { state }
    }

    pub fn signer(&self) -> EngineResult<Arc<PrivateKeySigner>> {
        match &self.state {
            KeyState::Ready(signer) => Ok(Arc::clone(signer)),
            KeyState::Missing => Err(EngineError::MissingSigner),
            KeyState::Invalid(reason) => Err(EngineError::InvalidConfig(format!(
                "invalid private key: {reason}"
            ))),
        }
    }

    pub fn address(&self) -> Option<Address> {
        match &self.state {
            KeyState::Ready(signer) => Some(signer.address()),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, KeyState::Ready(_))
    }
}

impl fmt::Debug for SignerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            KeyState::Missing => "missing".to_string(),
            KeyState::Invalid(_) => "invalid".to_string(),
            KeyState::Ready(signer) => signer.address().to_string(),
        };
        f.debug_struct("SignerIdentity").field("signer", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // anvil 默认账户 0
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn decodes_prefixed_and_bare_keys() {
        let prefixed = SignerIdentity::from_private_key(&Zeroizing::new(TEST_KEY.to_string()));
        let bare = SignerIdentity::from_private_key(&Zeroizing::new(
            TEST_KEY.trim_start_matches("0x").to_string(),
        ));
        let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(prefixed.address(), Some(expected));
        assert_eq!(bare.address(), Some(expected));
    }

    #[test]
    fn empty_key_is_missing() {
        let identity = SignerIdentity::from_private_key(&Zeroizing::new("  ".to_string()));
        assert!(!identity.is_ready());
        assert!(matches!(identity.signer(), Err(EngineError::MissingSigner)));
    }

    #[test]
    fn garbage_key_is_a_configuration_error() {
        let identity = SignerIdentity::from_private_key(&Zeroizing::new("0xnothex".to_string()));
        match identity.signer() {
            Err(EngineError::InvalidConfig(message)) => {
                assert!(message.starts_with("invalid private key"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn debug_output_never_contains_key_material() {
        let identity = SignerIdentity::from_private_key(&Zeroizing::new(TEST_KEY.to_string()));
        let rendered = format!("{identity:?}");
        assert!(!rendered.contains("ac0974bec39a17e3"));
    }
}
