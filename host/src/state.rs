//! The five states of the host state machine (spec.md §4.4), ported from
//! `ezsp_sm.h`'s `Ezsp_State` enum.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
	Initial,
	UartConnected,
	GettingDeviceInfo,
	InitNetwork,
	UpAndReady,
}
