use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::data::error::InputError;
use crate::data::types::{ReadGroup, ReadValue};
use crate::utils;

/// Token amounts are fixed-point with this many decimals.
pub const AMOUNT_DECIMALS: u8 = 18;

// Every function the dashboard touches, declared once.
sol! {
    #[allow(missing_docs)]
    interface IMintableToken {
        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
        function transfer(address to, uint256 value) external returns (bool);
        function mint(address to, uint256 value) external;
        function burn(uint256 value) external;

        event Transfer(address indexed from, address indexed to, uint256 value);
    }

    #[allow(missing_docs)]
    interface ITokenSwap {
        function swapEthForTokens() external payable;
        function swapTokensForEth(uint256 tokenAmount) external;
        function depositTokens(uint256 tokenAmount) external;
        function depositEth() external payable;
        function withdrawTokens(uint256 tokenAmount) external;
        function withdrawEth(uint256 ethAmount) external;
        function rate() external view returns (uint256);
    }
}

type DecodeFn = fn(&[u8]) -> alloy::sol_types::Result<ReadValue>;

/// A typed call argument, kept alongside the encoded calldata for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallArg {
    Address(Address),
    Amount(U256),
}

impl std::fmt::Display for CallArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallArg::Address(a) => write!(f, "{a}"),
            CallArg::Amount(v) => write!(f, "{}", utils::format_units(*v, AMOUNT_DECIMALS)),
        }
    }
}

/// A contract function call, identical in shape for reads and writes.
#[derive(Debug, Clone)]
pub struct CallDescriptor {
    pub contract: Address,
    pub signature: &'static str,
    pub args: Vec<CallArg>,
    pub calldata: Bytes,
    /// Native value attached to payable calls.
    pub value: Option<U256>,
    /// Simulate with `eth_call` before broadcasting.
    pub preflight: bool,
    decode: Option<DecodeFn>,
}

impl CallDescriptor {
    fn new<C: SolCall>(contract: Address, call: C, args: Vec<CallArg>) -> Self {
        Self {
            contract,
            signature: C::SIGNATURE,
            args,
            calldata: Bytes::from(call.abi_encode()),
            value: None,
            preflight: false,
            decode: None,
        }
    }

    fn returning(mut self, decode: DecodeFn) -> Self {
        self.decode = Some(decode);
        self
    }

    fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    fn simulated(mut self) -> Self {
        self.preflight = true;
        self
    }

    /// Decode raw `eth_call` output. Calls without a declared return decode to `Bool(true)`.
    pub fn decode_output(&self, data: &[u8]) -> alloy::sol_types::Result<ReadValue> {
        match self.decode {
            Some(decode) => decode(data),
            None => Ok(ReadValue::Bool(true)),
        }
    }

    /// Function name without the parameter list.
    pub fn function_name(&self) -> &'static str {
        self.signature
            .split_once('(')
            .map(|(name, _)| name)
            .unwrap_or(self.signature)
    }
}

fn decode_name(data: &[u8]) -> alloy::sol_types::Result<ReadValue> {
    IMintableToken::nameCall::abi_decode_returns(data, true).map(|r| ReadValue::Text(r._0))
}

fn decode_symbol(data: &[u8]) -> alloy::sol_types::Result<ReadValue> {
    IMintableToken::symbolCall::abi_decode_returns(data, true).map(|r| ReadValue::Text(r._0))
}

fn decode_balance(data: &[u8]) -> alloy::sol_types::Result<ReadValue> {
    IMintableToken::balanceOfCall::abi_decode_returns(data, true).map(|r| ReadValue::Uint(r._0))
}

fn decode_allowance(data: &[u8]) -> alloy::sol_types::Result<ReadValue> {
    IMintableToken::allowanceCall::abi_decode_returns(data, true).map(|r| ReadValue::Uint(r._0))
}

fn decode_rate(data: &[u8]) -> alloy::sol_types::Result<ReadValue> {
    ITokenSwap::rateCall::abi_decode_returns(data, true).map(|r| ReadValue::Uint(r._0))
}

/// Every write action the dashboard offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Transfer,
    Approve,
    Mint,
    Burn,
    SwapEthForTokens,
    SwapTokensForEth,
    DepositEth,
    DepositTokens,
    WithdrawEth,
    WithdrawTokens,
}

/// An input field of an action form. `name` is the field reported on validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
}

const RECIPIENT: FieldSpec = FieldSpec {
    name: "recipient",
    label: "Recipient Address",
    placeholder: "0x...",
};
const SPENDER: FieldSpec = FieldSpec {
    name: "spender",
    label: "Spender Address",
    placeholder: "0x...",
};
const AMOUNT: FieldSpec = FieldSpec {
    name: "amount",
    label: "Amount",
    placeholder: "0.0",
};
const ETH_AMOUNT: FieldSpec = FieldSpec {
    name: "eth amount",
    label: "ETH Amount",
    placeholder: "0.0",
};
const TOKEN_AMOUNT: FieldSpec = FieldSpec {
    name: "token amount",
    label: "Token Amount",
    placeholder: "0.0",
};

impl ActionKind {
    pub const TOKEN_ACTIONS: [ActionKind; 4] = [
        ActionKind::Transfer,
        ActionKind::Approve,
        ActionKind::Mint,
        ActionKind::Burn,
    ];

    pub const SWAP_ACTIONS: [ActionKind; 6] = [
        ActionKind::SwapEthForTokens,
        ActionKind::SwapTokensForEth,
        ActionKind::DepositEth,
        ActionKind::WithdrawEth,
        ActionKind::DepositTokens,
        ActionKind::WithdrawTokens,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Transfer => "Transfer",
            ActionKind::Approve => "Approve",
            ActionKind::Mint => "Mint",
            ActionKind::Burn => "Burn",
            ActionKind::SwapEthForTokens => "Swap ETH for Tokens",
            ActionKind::SwapTokensForEth => "Swap Tokens for ETH",
            ActionKind::DepositEth => "Deposit ETH",
            ActionKind::DepositTokens => "Deposit Tokens",
            ActionKind::WithdrawEth => "Withdraw ETH",
            ActionKind::WithdrawTokens => "Withdraw Tokens",
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            ActionKind::Transfer | ActionKind::Mint => &[RECIPIENT, AMOUNT],
            ActionKind::Approve => &[SPENDER, AMOUNT],
            ActionKind::Burn => &[AMOUNT],
            ActionKind::SwapEthForTokens | ActionKind::DepositEth | ActionKind::WithdrawEth => {
                &[ETH_AMOUNT]
            }
            ActionKind::SwapTokensForEth
            | ActionKind::DepositTokens
            | ActionKind::WithdrawTokens => &[TOKEN_AMOUNT],
        }
    }

    /// Read groups whose values this action can change once it is mined.
    pub fn invalidates(&self) -> &'static [ReadGroup] {
        match self {
            ActionKind::Approve => &[ReadGroup::Allowance],
            ActionKind::DepositEth | ActionKind::WithdrawEth => &[ReadGroup::Pool],
            // The pool pulls tokens with transferFrom, spending the allowance.
            ActionKind::SwapTokensForEth | ActionKind::DepositTokens => &[
                ReadGroup::Token,
                ReadGroup::Allowance,
                ReadGroup::Pool,
                ReadGroup::History,
            ],
            ActionKind::Transfer
            | ActionKind::Mint
            | ActionKind::Burn
            | ActionKind::SwapEthForTokens
            | ActionKind::WithdrawTokens => {
                &[ReadGroup::Token, ReadGroup::Pool, ReadGroup::History]
            }
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A write action as typed by the user, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Transfer { to: String, amount: String },
    Approve { spender: String, amount: String },
    Mint { to: String, amount: String },
    Burn { amount: String },
    SwapEthForTokens { eth_amount: String },
    SwapTokensForEth { token_amount: String },
    DepositEth { eth_amount: String },
    DepositTokens { token_amount: String },
    WithdrawEth { eth_amount: String },
    WithdrawTokens { token_amount: String },
}

impl ActionRequest {
    /// Build a request from form values ordered as `kind.fields()`. Missing values are empty.
    pub fn from_fields(kind: ActionKind, values: &[String]) -> Self {
        let field = |i: usize| values.get(i).cloned().unwrap_or_default();
        match kind {
            ActionKind::Transfer => ActionRequest::Transfer {
                to: field(0),
                amount: field(1),
            },
            ActionKind::Approve => ActionRequest::Approve {
                spender: field(0),
                amount: field(1),
            },
            ActionKind::Mint => ActionRequest::Mint {
                to: field(0),
                amount: field(1),
            },
            ActionKind::Burn => ActionRequest::Burn { amount: field(0) },
            ActionKind::SwapEthForTokens => ActionRequest::SwapEthForTokens {
                eth_amount: field(0),
            },
            ActionKind::SwapTokensForEth => ActionRequest::SwapTokensForEth {
                token_amount: field(0),
            },
            ActionKind::DepositEth => ActionRequest::DepositEth {
                eth_amount: field(0),
            },
            ActionKind::DepositTokens => ActionRequest::DepositTokens {
                token_amount: field(0),
            },
            ActionKind::WithdrawEth => ActionRequest::WithdrawEth {
                eth_amount: field(0),
            },
            ActionKind::WithdrawTokens => ActionRequest::WithdrawTokens {
                token_amount: field(0),
            },
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRequest::Transfer { .. } => ActionKind::Transfer,
            ActionRequest::Approve { .. } => ActionKind::Approve,
            ActionRequest::Mint { .. } => ActionKind::Mint,
            ActionRequest::Burn { .. } => ActionKind::Burn,
            ActionRequest::SwapEthForTokens { .. } => ActionKind::SwapEthForTokens,
            ActionRequest::SwapTokensForEth { .. } => ActionKind::SwapTokensForEth,
            ActionRequest::DepositEth { .. } => ActionKind::DepositEth,
            ActionRequest::DepositTokens { .. } => ActionKind::DepositTokens,
            ActionRequest::WithdrawEth { .. } => ActionKind::WithdrawEth,
            ActionRequest::WithdrawTokens { .. } => ActionKind::WithdrawTokens,
        }
    }
}

/// Addresses of the token and (optionally) its swap contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contracts {
    pub token: Address,
    pub swap: Option<Address>,
}

impl Contracts {
    pub fn new(token: Address, swap: Option<Address>) -> Self {
        Self { token, swap }
    }

    // --- Reads ---

    pub fn name(&self) -> CallDescriptor {
        CallDescriptor::new(self.token, IMintableToken::nameCall {}, vec![]).returning(decode_name)
    }

    pub fn symbol(&self) -> CallDescriptor {
        CallDescriptor::new(self.token, IMintableToken::symbolCall {}, vec![])
            .returning(decode_symbol)
    }

    pub fn balance_of(&self, owner: Address) -> CallDescriptor {
        CallDescriptor::new(
            self.token,
            IMintableToken::balanceOfCall { owner },
            vec![CallArg::Address(owner)],
        )
        .returning(decode_balance)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> CallDescriptor {
        CallDescriptor::new(
            self.token,
            IMintableToken::allowanceCall { owner, spender },
            vec![CallArg::Address(owner), CallArg::Address(spender)],
        )
        .returning(decode_allowance)
    }

    pub fn rate(&self) -> Option<CallDescriptor> {
        let swap = self.swap?;
        Some(CallDescriptor::new(swap, ITokenSwap::rateCall {}, vec![]).returning(decode_rate))
    }

    // --- Writes ---

    /// Validate a user request and encode it. Runs before any network access.
    pub fn build(&self, request: &ActionRequest) -> Result<CallDescriptor, InputError> {
        let descriptor = match request {
            ActionRequest::Transfer { to, amount } => {
                let to = parse_address(RECIPIENT.name, to)?;
                let value = parse_amount(AMOUNT.name, amount)?;
                CallDescriptor::new(
                    self.token,
                    IMintableToken::transferCall { to, value },
                    vec![CallArg::Address(to), CallArg::Amount(value)],
                )
            }
            ActionRequest::Approve { spender, amount } => {
                let spender = parse_address(SPENDER.name, spender)?;
                let value = parse_amount(AMOUNT.name, amount)?;
                CallDescriptor::new(
                    self.token,
                    IMintableToken::approveCall { spender, value },
                    vec![CallArg::Address(spender), CallArg::Amount(value)],
                )
            }
            ActionRequest::Mint { to, amount } => {
                let to = parse_address(RECIPIENT.name, to)?;
                let value = parse_amount(AMOUNT.name, amount)?;
                CallDescriptor::new(
                    self.token,
                    IMintableToken::mintCall { to, value },
                    vec![CallArg::Address(to), CallArg::Amount(value)],
                )
            }
            ActionRequest::Burn { amount } => {
                let value = parse_amount(AMOUNT.name, amount)?;
                CallDescriptor::new(
                    self.token,
                    IMintableToken::burnCall { value },
                    vec![CallArg::Amount(value)],
                )
            }
            ActionRequest::SwapEthForTokens { eth_amount } => {
                let swap = self.require_swap()?;
                let value = parse_amount(ETH_AMOUNT.name, eth_amount)?;
                CallDescriptor::new(swap, ITokenSwap::swapEthForTokensCall {}, vec![])
                    .with_value(value)
                    .simulated()
            }
            ActionRequest::SwapTokensForEth { token_amount } => {
                let swap = self.require_swap()?;
                let amount = parse_amount(TOKEN_AMOUNT.name, token_amount)?;
                CallDescriptor::new(
                    swap,
                    ITokenSwap::swapTokensForEthCall {
                        tokenAmount: amount,
                    },
                    vec![CallArg::Amount(amount)],
                )
                .simulated()
            }
            ActionRequest::DepositEth { eth_amount } => {
                let swap = self.require_swap()?;
                let value = parse_amount(ETH_AMOUNT.name, eth_amount)?;
                CallDescriptor::new(swap, ITokenSwap::depositEthCall {}, vec![])
                    .with_value(value)
                    .simulated()
            }
            ActionRequest::DepositTokens { token_amount } => {
                let swap = self.require_swap()?;
                let amount = parse_amount(TOKEN_AMOUNT.name, token_amount)?;
                CallDescriptor::new(
                    swap,
                    ITokenSwap::depositTokensCall {
                        tokenAmount: amount,
                    },
                    vec![CallArg::Amount(amount)],
                )
                .simulated()
            }
            ActionRequest::WithdrawEth { eth_amount } => {
                let swap = self.require_swap()?;
                let amount = parse_amount(ETH_AMOUNT.name, eth_amount)?;
                CallDescriptor::new(
                    swap,
                    ITokenSwap::withdrawEthCall { ethAmount: amount },
                    vec![CallArg::Amount(amount)],
                )
                .simulated()
            }
            ActionRequest::WithdrawTokens { token_amount } => {
                let swap = self.require_swap()?;
                let amount = parse_amount(TOKEN_AMOUNT.name, token_amount)?;
                CallDescriptor::new(
                    swap,
                    ITokenSwap::withdrawTokensCall {
                        tokenAmount: amount,
                    },
                    vec![CallArg::Amount(amount)],
                )
                .simulated()
            }
        };
        Ok(descriptor)
    }

    fn require_swap(&self) -> Result<Address, InputError> {
        self.swap
            .ok_or_else(|| InputError::new("swap contract", "is not configured"))
    }
}

/// Parse a `0x`-prefixed, 40 hex digit address.
pub fn parse_address(field: &'static str, input: &str) -> Result<Address, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::new(field, "is required"));
    }
    let hex = input
        .strip_prefix("0x")
        .ok_or_else(|| InputError::new(field, "must start with 0x"))?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(InputError::new(field, "must be 40 hexadecimal digits"));
    }
    input
        .parse::<Address>()
        .map_err(|e| InputError::new(field, e.to_string()))
}

/// Parse a human-readable decimal amount into 18-decimal fixed point. Zero is rejected.
pub fn parse_amount(field: &'static str, input: &str) -> Result<U256, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::new(field, "is required"));
    }
    if input.starts_with('-') {
        return Err(InputError::new(field, "must not be negative"));
    }
    let dots = input.chars().filter(|c| *c == '.').count();
    if dots > 1 || !input.chars().all(|c| c.is_ascii_digit() || c == '.') || input == "." {
        return Err(InputError::new(field, "is not a decimal number"));
    }
    if let Some((_, fraction)) = input.split_once('.') {
        if fraction.len() > AMOUNT_DECIMALS as usize {
            return Err(InputError::new(
                field,
                format!("has more than {AMOUNT_DECIMALS} decimal places"),
            ));
        }
    }
    let value = parse_ether(input).map_err(|e| InputError::new(field, e.to_string()))?;
    if value.is_zero() {
        return Err(InputError::new(field, "must be greater than zero"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolEvent;

    const TOKEN: Address = Address::repeat_byte(0x70);
    const SWAP: Address = Address::repeat_byte(0x5a);
    const BBB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn contracts() -> Contracts {
        Contracts::new(TOKEN, Some(SWAP))
    }

    #[test]
    fn test_parse_amount_fractional() {
        let value = parse_amount("amount", "1.5").unwrap();
        assert_eq!(value, U256::from(1_500_000_000_000_000_000u128));
    }

    #[test]
    fn test_parse_amount_whole_and_whitespace() {
        let value = parse_amount("amount", " 2 ").unwrap();
        assert_eq!(value, U256::from(2_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_parse_amount_rejects_bad_input() {
        for (input, reason) in [
            ("", "is required"),
            ("0", "must be greater than zero"),
            ("0.000", "must be greater than zero"),
            ("-1", "must not be negative"),
            ("abc", "is not a decimal number"),
            ("1.2.3", "is not a decimal number"),
            ("1e18", "is not a decimal number"),
            (".", "is not a decimal number"),
        ] {
            let err = parse_amount("amount", input).unwrap_err();
            assert_eq!(err.field, "amount", "input {input:?}");
            assert_eq!(err.reason, reason, "input {input:?}");
        }
    }

    #[test]
    fn test_parse_amount_too_many_decimals() {
        let err = parse_amount("amount", "0.0000000000000000001").unwrap_err();
        assert!(err.reason.contains("decimal places"));
    }

    #[test]
    fn test_parse_address() {
        let addr = parse_address("recipient", BBB).unwrap();
        assert_eq!(addr, Address::repeat_byte(0xbb));
    }

    #[test]
    fn test_parse_address_rejects_bad_shape() {
        assert_eq!(
            parse_address("recipient", "").unwrap_err().reason,
            "is required"
        );
        assert_eq!(
            parse_address("recipient", "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb")
                .unwrap_err()
                .reason,
            "must start with 0x"
        );
        assert_eq!(
            parse_address("recipient", "0xbbbb").unwrap_err().reason,
            "must be 40 hexadecimal digits"
        );
        assert_eq!(
            parse_address("recipient", "0xzzbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb")
                .unwrap_err()
                .reason,
            "must be 40 hexadecimal digits"
        );
    }

    #[test]
    fn test_transfer_descriptor_encodes_value() {
        let request = ActionRequest::Transfer {
            to: BBB.to_string(),
            amount: "1.5".to_string(),
        };
        let call = contracts().build(&request).unwrap();
        assert_eq!(call.contract, TOKEN);
        assert_eq!(call.signature, "transfer(address,uint256)");
        assert_eq!(call.function_name(), "transfer");
        assert_eq!(call.value, None);
        assert!(!call.preflight);

        let decoded = IMintableToken::transferCall::abi_decode(&call.calldata, true).unwrap();
        assert_eq!(decoded.to, Address::repeat_byte(0xbb));
        assert_eq!(
            decoded.value,
            "1500000000000000000".parse::<U256>().unwrap()
        );
        assert_eq!(
            call.args,
            vec![
                CallArg::Address(Address::repeat_byte(0xbb)),
                CallArg::Amount(U256::from(1_500_000_000_000_000_000u128)),
            ]
        );
    }

    #[test]
    fn test_invalid_field_is_named() {
        let request = ActionRequest::Approve {
            spender: "0x123".to_string(),
            amount: "1".to_string(),
        };
        let err = contracts().build(&request).unwrap_err();
        assert_eq!(err.field, "spender");

        let request = ActionRequest::Mint {
            to: BBB.to_string(),
            amount: "zero".to_string(),
        };
        let err = contracts().build(&request).unwrap_err();
        assert_eq!(err.field, "amount");
    }

    #[test]
    fn test_burn_descriptor() {
        let call = contracts()
            .build(&ActionRequest::Burn {
                amount: "3".to_string(),
            })
            .unwrap();
        assert_eq!(call.signature, "burn(uint256)");
        let decoded = IMintableToken::burnCall::abi_decode(&call.calldata, true).unwrap();
        assert_eq!(decoded.value, U256::from(3_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_payable_swap_attaches_value() {
        let call = contracts()
            .build(&ActionRequest::SwapEthForTokens {
                eth_amount: "0.25".to_string(),
            })
            .unwrap();
        assert_eq!(call.contract, SWAP);
        assert_eq!(call.signature, "swapEthForTokens()");
        assert_eq!(call.value, Some(U256::from(250_000_000_000_000_000u128)));
        assert!(call.preflight);
        assert!(call.args.is_empty());
        assert_eq!(&call.calldata[..], &ITokenSwap::swapEthForTokensCall::SELECTOR[..]);
    }

    #[test]
    fn test_withdraw_eth_encodes_amount() {
        let call = contracts()
            .build(&ActionRequest::WithdrawEth {
                eth_amount: "1".to_string(),
            })
            .unwrap();
        assert_eq!(call.value, None);
        let decoded = ITokenSwap::withdrawEthCall::abi_decode(&call.calldata, true).unwrap();
        assert_eq!(decoded.ethAmount, U256::from(1_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_swap_requires_contract() {
        let contracts = Contracts::new(TOKEN, None);
        let err = contracts
            .build(&ActionRequest::DepositTokens {
                token_amount: "1".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.field, "swap contract");
        assert!(contracts.rate().is_none());
    }

    #[test]
    fn test_read_descriptors_decode() {
        let c = contracts();
        let word = U256::from(42u64).to_be_bytes::<32>();
        assert_eq!(
            c.balance_of(Address::ZERO).decode_output(&word).unwrap(),
            ReadValue::Uint(U256::from(42u64))
        );
        assert_eq!(
            c.rate().unwrap().decode_output(&word).unwrap(),
            ReadValue::Uint(U256::from(42u64))
        );

        let encoded = IMintableToken::symbolCall::abi_encode_returns(&("MEM".to_string(),));
        assert_eq!(
            c.symbol().decode_output(&encoded).unwrap(),
            ReadValue::Text("MEM".to_string())
        );
        assert!(c.name().decode_output(&[0u8; 3]).is_err());
    }

    #[test]
    fn test_from_fields_matches_kind() {
        for kind in ActionKind::TOKEN_ACTIONS
            .iter()
            .chain(ActionKind::SWAP_ACTIONS.iter())
        {
            let values = vec![String::new(); kind.fields().len()];
            assert_eq!(ActionRequest::from_fields(*kind, &values).kind(), *kind);
        }
    }

    #[test]
    fn test_invalidation_groups() {
        assert_eq!(ActionKind::Approve.invalidates(), &[ReadGroup::Allowance]);
        assert!(ActionKind::Transfer.invalidates().contains(&ReadGroup::Token));
        assert!(ActionKind::Transfer.invalidates().contains(&ReadGroup::History));
        assert_eq!(ActionKind::DepositEth.invalidates(), &[ReadGroup::Pool]);
        for kind in [ActionKind::SwapTokensForEth, ActionKind::DepositTokens] {
            let groups = kind.invalidates();
            assert!(groups.contains(&ReadGroup::Allowance), "{kind}: {groups:?}");
            assert!(groups.contains(&ReadGroup::Token), "{kind}: {groups:?}");
        }
        assert!(!ActionKind::SwapEthForTokens.invalidates().contains(&ReadGroup::Allowance));
    }

    #[test]
    fn test_transfer_event_signature() {
        let expected: alloy::primitives::B256 =
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
                .parse()
                .unwrap();
        assert_eq!(IMintableToken::Transfer::SIGNATURE_HASH, expected);
    }
}
