pub use self::{
    analysis::{
        AnalysisFailure, AnalysisResult, AnalysisSuccess, Summary, TokenTotal,
    },
    price::{PriceBody, PricePayload},
    request::{
        BridgeRequest, ChainTx, CurrencyAmount, CurrencyInfo, RequestData,
        RequestMetadata, RequestsPage, TransactionsPayload,
    },
};

mod analysis;
mod price;
mod request;
