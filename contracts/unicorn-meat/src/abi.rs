//! Minimal Solidity ABI codec covering the argument and return types the
//! Unicorn Meat contracts use.

use crate::error::{ErrorCode, Result};
use crate::utils::{keccak256, Address, U256};

/// `Error(string)` revert payload selector.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
/// `Panic(uint256)` revert payload selector.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

const WORD: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Uint(U256),
    Bool(bool),
    Address(Address),
    FixedBytes([u8; 32]),
    Bytes(Vec<u8>),
    String(String),
    FixedBytesArray(Vec<[u8; 32]>),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        matches!(
            self,
            Token::Bytes(_) | Token::String(_) | Token::FixedBytesArray(_)
        )
    }
}

/// First four bytes of the Keccak-256 hash of a canonical signature such as
/// `balanceOf(address)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn pad_right(bytes: &[u8]) -> Vec<u8> {
    let padded_len = bytes.len().div_ceil(WORD) * WORD;
    let mut out = bytes.to_vec();
    out.resize(padded_len, 0);
    out
}

fn encode_static(token: &Token) -> [u8; 32] {
    match token {
        Token::Uint(value) => value.to_word(),
        Token::Bool(flag) => U256::from(u64::from(*flag)).to_word(),
        Token::Address(address) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(address.as_bytes());
            word
        }
        Token::FixedBytes(bytes) => *bytes,
        Token::Bytes(_) | Token::String(_) | Token::FixedBytesArray(_) => {
            unreachable!("dynamic tokens are encoded in the tail")
        }
    }
}

fn encode_dynamic(token: &Token) -> Vec<u8> {
    match token {
        Token::Bytes(bytes) => {
            let mut out = U256::from(bytes.len() as u64).to_word().to_vec();
            out.extend(pad_right(bytes));
            out
        }
        Token::String(text) => encode_dynamic(&Token::Bytes(text.as_bytes().to_vec())),
        Token::FixedBytesArray(items) => {
            let mut out = U256::from(items.len() as u64).to_word().to_vec();
            for item in items {
                out.extend_from_slice(item);
            }
            out
        }
        _ => encode_static(token).to_vec(),
    }
}

/// Head/tail encoding of an argument list.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&U256::from((head_len + tail.len()) as u64).to_word());
            tail.extend(encode_dynamic(token));
        } else {
            head.extend_from_slice(&encode_static(token));
        }
    }
    head.extend(tail);
    head
}

/// Selector followed by the encoded arguments.
pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut data = selector(signature).to_vec();
    data.extend(encode(tokens));
    data
}

/// Sequential reader over ABI-encoded return data.
///
/// Dynamic members are followed through their head offset, which is relative
/// to the start of the data the decoder was created with.
pub struct Decoder<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Decoder { data, cursor: 0 }
    }

    fn word_at(&self, offset: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(WORD)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| {
                ErrorCode::Decode(format!(
                    "need a word at offset {}, have {} bytes",
                    offset,
                    self.data.len()
                ))
            })
    }

    pub fn word(&mut self) -> Result<[u8; 32]> {
        let slice = self.word_at(self.cursor)?;
        self.cursor += WORD;
        let mut word = [0u8; 32];
        word.copy_from_slice(slice);
        Ok(word)
    }

    pub fn uint(&mut self) -> Result<U256> {
        Ok(U256::from_word(&self.word()?))
    }

    /// A `uint256` that must fit in 64 bits, such as a timestamp.
    pub fn u64(&mut self) -> Result<u64> {
        let value = self.uint()?;
        value
            .try_to_u64()
            .ok_or_else(|| ErrorCode::Decode(format!("value {} does not fit in 64 bits", value)))
    }

    pub fn bool(&mut self) -> Result<bool> {
        Ok(!self.uint()?.is_zero())
    }

    pub fn address(&mut self) -> Result<Address> {
        let word = self.word()?;
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Ok(Address(bytes))
    }

    pub fn fixed_bytes(&mut self) -> Result<[u8; 32]> {
        self.word()
    }

    pub fn bytes(&mut self) -> Result<Vec<u8>> {
        let offset = self.u64()? as usize;
        let len_word = self.word_at(offset)?;
        let len = U256::from_word(len_word)
            .try_to_u64()
            .ok_or_else(|| ErrorCode::Decode("dynamic length overflows".to_string()))? as usize;
        let start = offset + WORD;
        start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .map(|slice| slice.to_vec())
            .ok_or_else(|| {
                ErrorCode::Decode(format!("dynamic value of {} bytes runs past the data", len))
            })
    }

    /// UTF-8 string; invalid sequences are replaced rather than rejected since
    /// proposal descriptions are free text written by anyone.
    pub fn string(&mut self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.bytes()?).into_owned())
    }
}

/// Best-effort human reason from revert data.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (selector, payload) = data.split_at(4);
    if selector == ERROR_STRING_SELECTOR {
        Decoder::new(payload).string().ok()
    } else if selector == PANIC_SELECTOR {
        Decoder::new(payload)
            .uint()
            .ok()
            .map(|code| format!("panic code 0x{:x}", code))
    } else {
        None
    }
}

/// Decodes `0x`-prefixed hex as returned by JSON-RPC.
pub fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(digits).map_err(|e| ErrorCode::InvalidInput(format!("bad hex `{}`: {}", input, e)))
}

pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_known_erc20_values() {
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("approve(address,uint256)")), "095ea7b3");
        assert_eq!(hex::encode(selector("Error(string)")), hex::encode(ERROR_STRING_SELECTOR));
    }

    #[test]
    fn static_arguments_fill_one_word_each() {
        let spender = Address([0x11; 20]);
        let data = encode_call(
            "approve(address,uint256)",
            &[Token::Address(spender), Token::Uint(U256::from(1000u64))],
        );
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[4 + 12..4 + 32], &[0x11; 20]);
        assert_eq!(data[4 + 63], 0xe8);
        assert_eq!(data[4 + 62], 0x03);
    }

    #[test]
    fn dynamic_arguments_go_to_the_tail() {
        let encoded = encode(&[
            Token::Uint(U256::from(7u64)),
            Token::String("hi".to_string()),
            Token::Bool(true),
        ]);
        // head: 3 words, tail: length word + one padded data word
        assert_eq!(encoded.len(), 5 * 32);
        assert_eq!(U256::from_word(&encoded[32..64]), U256::from(96u64));
        assert_eq!(U256::from_word(&encoded[96..128]), U256::from(2u64));
        assert_eq!(&encoded[128..130], b"hi");
    }

    #[test]
    fn proof_array_encodes_length_then_items() {
        let proof = vec![[0xaa; 32], [0xbb; 32]];
        let encoded = encode(&[Token::FixedBytesArray(proof)]);
        assert_eq!(U256::from_word(&encoded[..32]), U256::from(32u64));
        assert_eq!(U256::from_word(&encoded[32..64]), U256::from(2u64));
        assert_eq!(encoded[64], 0xaa);
        assert_eq!(encoded[96], 0xbb);
    }

    #[test]
    fn decoder_follows_string_offsets() {
        let encoded = encode(&[
            Token::Address(Address([0x22; 20])),
            Token::String("grind the unicorns".to_string()),
            Token::Bool(false),
        ]);
        let mut decoder = Decoder::new(&encoded);
        assert_eq!(decoder.address().unwrap(), Address([0x22; 20]));
        assert_eq!(decoder.string().unwrap(), "grind the unicorns");
        assert!(!decoder.bool().unwrap());
    }

    #[test]
    fn decoder_reports_short_data() {
        let mut decoder = Decoder::new(&[0u8; 16]);
        assert!(matches!(decoder.uint(), Err(ErrorCode::Decode(_))));
    }

    #[test]
    fn huge_offsets_are_decode_errors() {
        let mut data = vec![0u8; 24];
        data.extend([0xff; 8]);
        assert!(matches!(Decoder::new(&data).string(), Err(ErrorCode::Decode(_))));

        // valid offset, length word of u64::MAX
        let mut data = U256::from(32u64).to_word().to_vec();
        data.extend(U256::from(u64::MAX).to_word());
        assert!(matches!(Decoder::new(&data).bytes(), Err(ErrorCode::Decode(_))));
    }

    #[test]
    fn revert_reasons_are_extracted() {
        let mut data = ERROR_STRING_SELECTOR.to_vec();
        data.extend(encode(&[Token::String("Insufficient balance".to_string())]));
        assert_eq!(decode_revert_reason(&data).as_deref(), Some("Insufficient balance"));

        let mut panic = PANIC_SELECTOR.to_vec();
        panic.extend(encode(&[Token::Uint(U256::from(0x11u64))]));
        assert_eq!(decode_revert_reason(&panic).as_deref(), Some("panic code 0x11"));

        assert_eq!(decode_revert_reason(&[1, 2]), None);
    }
}
