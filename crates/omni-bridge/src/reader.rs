//! Read Client - view calls against the starship and stat contracts

use crate::abi::{IPlayerStat, IStarHub, IStarship};
use crate::rpc::{CallError, ContractCaller};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use omni_types::{
    GameState, MessagingFee, NetworkDescriptor, NetworkKey, OmniError, OmniResult, SendParam,
    ShipStats,
};

/// Per-chain starship reads
#[async_trait]
pub trait StarshipRead: Send + Sync {
    fn network(&self) -> &NetworkKey;

    /// Number of ships held by `owner`; 0 is a normal answer, not an error
    async fn balance_of(&self, owner: Address) -> OmniResult<u64>;

    /// Owner of `token_id`; `TokenNotFound` if the token does not exist here
    async fn owner_of(&self, token_id: u64) -> OmniResult<Address>;

    async fn token_uri(&self, token_id: u64) -> OmniResult<String>;
}

/// Hub chain stat reads
#[async_trait]
pub trait StatRead: Send + Sync {
    async fn player_stats(&self, player_id: u64) -> OmniResult<ShipStats>;
}

/// ABI-encode `call`, run it against `contract`, decode the return
async fn view<C, T>(caller: &C, contract: Address, call: &T) -> Result<T::Return, CallError>
where
    C: ContractCaller + ?Sized,
    T: SolCall + Sync,
{
    let data = Bytes::from(call.abi_encode());
    let output = caller.call(contract, data).await?;
    T::abi_decode_returns(&output, true).map_err(|e| CallError::Decode(e.to_string()))
}

fn to_u64(network: &NetworkKey, value: U256, what: &str) -> OmniResult<u64> {
    u64::try_from(value).map_err(|_| {
        OmniError::read_failed(network, format!("{} {} does not fit u64", what, value))
    })
}

/// Starship ONFT reader for one chain
pub struct StarshipReader<C> {
    network: NetworkKey,
    contract: Address,
    caller: C,
}

impl<C: ContractCaller> StarshipReader<C> {
    pub fn new(descriptor: &NetworkDescriptor, caller: C) -> Self {
        Self {
            network: descriptor.key.clone(),
            contract: descriptor.contract_address,
            caller,
        }
    }

    /// `quoteSend(sendParam, false)`: fee for an ONFT send paid in native gas
    pub async fn quote_send(&self, param: &SendParam) -> OmniResult<MessagingFee> {
        let call = IStarship::quoteSendCall {
            sendParam: param.into(),
            payInLzToken: false,
        };
        let fee = view(&self.caller, self.contract, &call)
            .await
            .map_err(|e| OmniError::read_failed(&self.network, e))?;
        Ok(fee._0.into())
    }
}

#[async_trait]
impl<C: ContractCaller> StarshipRead for StarshipReader<C> {
    fn network(&self) -> &NetworkKey {
        &self.network
    }

    async fn balance_of(&self, owner: Address) -> OmniResult<u64> {
        let ret = view(&self.caller, self.contract, &IStarship::balanceOfCall { owner })
            .await
            .map_err(|e| OmniError::read_failed(&self.network, e))?;
        to_u64(&self.network, ret._0, "balance")
    }

    async fn owner_of(&self, token_id: u64) -> OmniResult<Address> {
        let call = IStarship::ownerOfCall {
            tokenId: U256::from(token_id),
        };
        match view(&self.caller, self.contract, &call).await {
            Ok(ret) => Ok(ret._0),
            // ERC721 reverts for ids that were never minted or were burned by a send
            Err(CallError::Reverted(_)) => Err(OmniError::TokenNotFound(token_id)),
            Err(e) => Err(OmniError::read_failed(&self.network, e)),
        }
    }

    async fn token_uri(&self, token_id: u64) -> OmniResult<String> {
        let call = IStarship::tokenURICall {
            tokenId: U256::from(token_id),
        };
        match view(&self.caller, self.contract, &call).await {
            Ok(ret) => Ok(ret._0),
            Err(CallError::Reverted(_)) => Err(OmniError::TokenNotFound(token_id)),
            Err(e) => Err(OmniError::read_failed(&self.network, e)),
        }
    }
}

/// PlayerStat reader on the hub chain
pub struct PlayerStatReader<C> {
    network: NetworkKey,
    contract: Address,
    caller: C,
}

impl<C: ContractCaller> PlayerStatReader<C> {
    pub fn new(network: NetworkKey, contract: Address, caller: C) -> Self {
        Self {
            network,
            contract,
            caller,
        }
    }
}

#[async_trait]
impl<C: ContractCaller> StatRead for PlayerStatReader<C> {
    async fn player_stats(&self, player_id: u64) -> OmniResult<ShipStats> {
        let call = IPlayerStat::playersCall {
            playerId: U256::from(player_id),
        };
        let ret = view(&self.caller, self.contract, &call)
            .await
            .map_err(|e| OmniError::read_failed(&self.network, e))?;

        Ok(ShipStats {
            attack: to_u64(&self.network, ret.attack, "attack")?,
            defense: to_u64(&self.network, ret.defense, "defense")?,
            health: to_u64(&self.network, ret.health, "health")?,
        })
    }
}

/// StarHub battle reader on the hub chain
pub struct StarHubReader<C> {
    network: NetworkKey,
    contract: Address,
    caller: C,
}

impl<C: ContractCaller> StarHubReader<C> {
    pub fn new(network: NetworkKey, contract: Address, caller: C) -> Self {
        Self {
            network,
            contract,
            caller,
        }
    }

    /// `getGameState()` plus `MAX_HEALTH()`
    pub async fn game_state(&self) -> OmniResult<GameState> {
        let state = view(&self.caller, self.contract, &IStarHub::getGameStateCall {})
            .await
            .map_err(|e| OmniError::read_failed(&self.network, e))?;
        let max_health = view(&self.caller, self.contract, &IStarHub::MAX_HEALTHCall {})
            .await
            .map_err(|e| OmniError::read_failed(&self.network, e))?;

        Ok(GameState {
            active: state.active,
            round: state.round.into(),
            players: [
                ShipStats {
                    attack: state.player1Attack.into(),
                    defense: state.player1Defense.into(),
                    health: state.player1Health.into(),
                },
                ShipStats {
                    attack: state.player2Attack.into(),
                    defense: state.player2Defense.into(),
                    health: state.player2Health.into(),
                },
            ],
            winner: (!state.winner.is_zero()).then_some(state.winner),
            max_health: max_health._0.into(),
        })
    }
}
