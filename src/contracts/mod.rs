pub mod erc20;
pub mod provisions;

pub use erc20::ERC20Contract;
pub use provisions::ProvisionsContract;
