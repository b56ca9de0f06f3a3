mod bus;
mod notification;

pub use bus::EventBus;
pub use notification::{
    BlockAddedNotification, CubeCompleteNotification, FaceCompleteNotification, Notification, RawTxAddedNotification,
    SupercubeCompleteNotification, TxFinalizedNotification, TxProcessingNotification, ValidationCompleteNotification,
    ValidationTasksCreatedNotification,
};
