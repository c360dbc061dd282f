//! Contract ABI definitions for the Safe singleton and the CreateCall helper.

use alloy::primitives::{address, Address};
use alloy::sol;

/// Default CreateCall library used to deploy contracts through a delegate call.
pub const DEFAULT_CREATE_CALL_ADDRESS: Address =
    address!("8538FcBccba7f5303d2C679Fa5d7A629A8c9bf4A");

sol! {
    /// Safe owner management, execution and gas measurement entry points.
    interface ISafe {
        function getOwners() external view returns (address[] memory);
        function getThreshold() external view returns (uint256);
        function isOwner(address owner) external view returns (bool);
        function nonce() external view returns (uint256);

        function addOwnerWithThreshold(address owner, uint256 _threshold) external;
        function removeOwner(address prevOwner, address owner, uint256 _threshold) external;
        function swapOwner(address prevOwner, address oldOwner, address newOwner) external;
        function changeThreshold(uint256 _threshold) external;

        /// Measures the gas used by an inner call and always reverts with the
        /// amount packed into the revert string.
        function requiredTxGas(address to, uint256 value, bytes calldata data, uint8 operation)
            external
            returns (uint256);

        function execTransaction(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            bytes memory signatures
        ) external payable returns (bool success);
    }

    /// Forwards contract creation when delegate-called from a Safe.
    interface ICreateCall {
        function performCreate(uint256 value, bytes memory deploymentData)
            external
            returns (address newContract);
    }

    /// EIP-712 typed struct signed by Safe owners.
    #[derive(Debug)]
    struct SafeTx {
        address to;
        uint256 value;
        bytes data;
        uint8 operation;
        uint256 safeTxGas;
        uint256 baseGas;
        uint256 gasPrice;
        address gasToken;
        address refundReceiver;
        uint256 nonce;
    }
}
