use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};

/// BSC system contract coordinating relay fees and locked BEP20 balances.
pub const TOKEN_HUB_ADDRESS: Address = address!("0000000000000000000000000000000000001004");
/// BSC system contract that approves or rejects bind requests.
pub const TOKEN_MANAGER_ADDRESS: Address = address!("0000000000000000000000000000000000001008");

alloy_sol_types::sol! {
    interface IBEP20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function getOwner() external view returns (address);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address recipient, uint256 amount) external returns (bool);
    }

    interface IOwnable {
        function transferOwnership(address newOwner) external;
    }

    interface ITokenManager {
        event bindSuccess(address indexed contractAddr, string bep2Symbol, uint256 totalSupply, uint256 peggyAmount);

        function queryRequiredLockAmountForBind(string symbol) external view returns (uint256);
        function approveBind(address contractAddr, string bep2Symbol) external payable returns (bool);
        function rejectBind(address contractAddr, string bep2Symbol) external payable returns (bool);
    }

    interface ITokenHub {
        function getMiniRelayFee() external view returns (uint256);
    }

    interface IERC721 {
        function totalSupply() external view returns (uint256);
    }

    interface ICanonicalBEP20 {
        function initialize(string name, string symbol, uint8 decimals, uint256 amount, bool mintable, address owner) external;
    }
}

pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    Bytes::from(IBEP20::approveCall { spender, amount }.abi_encode())
}

pub fn encode_transfer(recipient: Address, amount: U256) -> Bytes {
    Bytes::from(IBEP20::transferCall { recipient, amount }.abi_encode())
}

pub fn encode_transfer_ownership(new_owner: Address) -> Bytes {
    Bytes::from(IOwnable::transferOwnershipCall { newOwner: new_owner }.abi_encode())
}

pub fn encode_approve_bind(contract: Address, bep2_symbol: &str) -> Bytes {
    let call = ITokenManager::approveBindCall {
        contractAddr: contract,
        bep2Symbol: bep2_symbol.to_string(),
    };
    Bytes::from(call.abi_encode())
}

pub fn encode_reject_bind(contract: Address, bep2_symbol: &str) -> Bytes {
    let call = ITokenManager::rejectBindCall {
        contractAddr: contract,
        bep2Symbol: bep2_symbol.to_string(),
    };
    Bytes::from(call.abi_encode())
}

/// Parameters for `initialize` on the canonical upgradeable BEP20.
#[derive(Debug, Clone)]
pub struct CanonicalTokenParams {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
    pub mintable: bool,
    pub owner: Address,
}

/// Creation code for a proxy pointing at `implementation`, administered by
/// `proxy_admin`, whose constructor delegates `initialize(...)`.
pub fn encode_canonical_proxy_deploy(
    proxy_creation_code: &Bytes,
    implementation: Address,
    proxy_admin: Address,
    params: &CanonicalTokenParams,
) -> Bytes {
    let initialize = ICanonicalBEP20::initializeCall {
        name: params.name.clone(),
        symbol: params.symbol.clone(),
        decimals: params.decimals,
        amount: params.total_supply,
        mintable: params.mintable,
        owner: params.owner,
    }
    .abi_encode();
    let constructor_args =
        (implementation, proxy_admin, Bytes::from(initialize)).abi_encode_params();

    let mut out = Vec::with_capacity(proxy_creation_code.len() + constructor_args.len());
    out.extend_from_slice(proxy_creation_code);
    out.extend_from_slice(&constructor_args);
    Bytes::from(out)
}
