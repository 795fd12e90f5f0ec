//! Contract bindings
//!
//! `IStarship` is the ONFT721 starship (`MyONFT721Mock` deployment),
//! `IPlayerStat` the stat contract on the hub chain and `IStarHub` the
//! battle contract deployed at the same hub address.

use alloy_sol_types::sol;
use omni_types::transfer;

sol! {
    struct SendParam {
        uint32 dstEid;
        bytes32 to;
        uint256 tokenId;
        bytes extraOptions;
        bytes composeMsg;
        bytes onftCmd;
    }

    struct MessagingFee {
        uint256 nativeFee;
        uint256 lzTokenFee;
    }

    interface IStarship {
        function balanceOf(address owner) external view returns (uint256);
        function ownerOf(uint256 tokenId) external view returns (address);
        function tokenURI(uint256 tokenId) external view returns (string memory);
        function mint(address to, uint256 amount) external;
        function quoteSend(SendParam calldata sendParam, bool payInLzToken)
            external
            view
            returns (MessagingFee memory);
        function send(
            SendParam calldata sendParam,
            MessagingFee calldata fee,
            address refundAddress
        ) external payable;
    }

    interface IPlayerStat {
        function players(uint256 playerId)
            external
            view
            returns (uint256 health, uint256 attack, uint256 defense);
    }

    interface IStarHub {
        function getGameState()
            external
            view
            returns (
                bool active,
                uint8 round,
                uint8 player1Health,
                uint8 player2Health,
                uint8 player1Attack,
                uint8 player1Defense,
                uint8 player2Attack,
                uint8 player2Defense,
                address winner
            );
        function MAX_HEALTH() external view returns (uint8);
    }
}

impl From<&transfer::SendParam> for SendParam {
    fn from(param: &transfer::SendParam) -> Self {
        Self {
            dstEid: param.dst_eid,
            to: param.to,
            tokenId: param.token_id,
            extraOptions: param.extra_options.clone(),
            composeMsg: param.compose_msg.clone(),
            onftCmd: param.onft_cmd.clone(),
        }
    }
}

impl From<&transfer::MessagingFee> for MessagingFee {
    fn from(fee: &transfer::MessagingFee) -> Self {
        Self {
            nativeFee: fee.native_fee,
            lzTokenFee: fee.lz_token_fee,
        }
    }
}

impl From<MessagingFee> for transfer::MessagingFee {
    fn from(fee: MessagingFee) -> Self {
        Self {
            native_fee: fee.nativeFee,
            lz_token_fee: fee.lzTokenFee,
        }
    }
}
