// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! ABI of the two deployed contracts. Encrypted values (`euint64`, `externalEuint64`, `ebool`)
//! travel as `bytes32` handles.

use alloy::sol;

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    contract WrapETH {
        event ConfidentialTransfer(address indexed from, address indexed to, bytes32 indexed amount);
        event OperatorSet(address indexed holder, address indexed operator, uint48 until);
        event AmountDiscloseRequested(bytes32 indexed encryptedAmount, address indexed requester);
        event AmountDisclosed(bytes32 indexed encryptedAmount, uint64 amount);

        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function confidentialTotalSupply() external view returns (bytes32);
        function confidentialBalanceOf(address account) external view returns (bytes32);
        function isOperator(address holder, address spender) external view returns (bool);

        function mint(address to, uint64 amount) external;
        function setOperator(address operator, uint48 until) external;
        function confidentialTransferAndCall(address to, bytes32 encryptedAmount, bytes calldata inputProof, bytes calldata data) external returns (bytes32 transferred);
        function requestDiscloseEncryptedAmount(bytes32 encryptedAmount) external;
        function discloseEncryptedAmount(bytes32 encryptedAmount, uint64 cleartextAmount, bytes calldata decryptionProof) external;
    }
}

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    contract CloakFundraiser {
        error CampaignEnded();
        error InvalidEndTime();
        error InvalidToken();
        error NotOwner();

        event CampaignUpdated(string name, uint64 targetAmount, uint64 endTime);
        event ContributionRecorded(address indexed contributor, bytes32 amount, bytes data);
        event FundraisingEnded(address indexed owner, uint64 timestamp);
        event Withdrawn(address indexed owner, bytes32 amount);

        constructor(address weth, string memory name_, uint64 targetAmount_, uint64 endTime_);

        function campaignName() external view returns (string memory);
        function targetAmount() external view returns (uint64);
        function endTime() external view returns (uint64);
        function owner() external view returns (address);
        function isActive() external view returns (bool);
        function isEnded() external view returns (bool);
        function token() external view returns (address);
        function totalRaised() external view returns (bytes32);
        function contributionOf(address contributor) external view returns (bytes32);

        function updateCampaign(string calldata name_, uint64 targetAmount_, uint64 endTime_) external;
        function endFundraising() external;
        function onConfidentialTransferReceived(address operator, address from, bytes32 amount, bytes calldata data) external returns (bytes32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::{SolCall, SolError, SolEvent};

    #[test]
    fn test_selectors_match_deployed_abi() {
        assert_eq!(
            WrapETH::confidentialTransferAndCallCall::SIGNATURE,
            "confidentialTransferAndCall(address,bytes32,bytes,bytes)"
        );
        assert_eq!(WrapETH::mintCall::SIGNATURE, "mint(address,uint64)");
        assert_eq!(
            CloakFundraiser::updateCampaignCall::SIGNATURE,
            "updateCampaign(string,uint64,uint64)"
        );
        assert_eq!(CloakFundraiser::NotOwner::SIGNATURE, "NotOwner()");
        assert_eq!(
            CloakFundraiser::ContributionRecorded::SIGNATURE,
            "ContributionRecorded(address,bytes32,bytes)"
        );
    }
}
