//! The closed set of known EZSP command ids, their direction, and a diagnostic name.
//! Ids follow the legacy (pre-v8) single-byte numbering; under protocol version 8 the same
//! ids are carried in the two-byte field instead.

/// Whether a command id is sent by the host, the NCP, or both (commands with an asynchronous
/// callback counterpart).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	Command,
	Response,
	Both,
}

macro_rules! commands {
	( $( $variant:ident = $id:literal, $name:literal, $dir:ident; )* ) => {
		/// A known EZSP command id.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum CommandId {
			$( $variant, )*
		}

		impl CommandId {
			/// Decode a legacy (versions <8) single-byte command id.
			pub fn from_u8(id: u8) -> Option<Self> {
				match id {
					$( $id => Some(Self::$variant), )*
					_ => None,
				}
			}

			/// The wire id, common to both the legacy single-byte and v8 two-byte encodings.
			pub fn id(self) -> u16 {
				match self {
					$( Self::$variant => $id, )*
				}
			}

			/// Decode a version-8 two-byte command id.
			pub fn from_u16(id: u16) -> Option<Self> {
				Self::from_u8(u8::try_from(id).ok()?)
			}

			/// A diagnostic name, for logging only.
			pub fn name(self) -> &'static str {
				match self {
					$( Self::$variant => $name, )*
				}
			}

			pub fn direction(self) -> Direction {
				match self {
					$( Self::$variant => Direction::$dir, )*
				}
			}
		}
	};
}

commands! {
	Version = 0x00, "version", Both;
	Callback = 0x06, "callback", Command;
	NoCallbacks = 0x07, "noCallbacks", Command;
	SetConfigurationValue = 0x53, "setConfigurationValue", Command;
	GetConfigurationValue = 0x52, "getConfigurationValue", Command;
	SetValue = 0xAB, "setValue", Command;
	GetValue = 0xAA, "getValue", Command;
	InvalidCommand = 0x58, "invalidCommand", Response;
	GetEui64 = 0x26, "getEui64", Command;
	GetNodeId = 0x27, "getNodeId", Command;
	StartScan = 0x1A, "startScan", Command;
	StopScan = 0x1D, "stopScan", Command;
	ScanCompleteHandler = 0x1C, "scanCompleteHandler", Response;
	NetworkFoundHandler = 0x1B, "networkFoundHandler", Response;
	EnergyScanResultHandler = 0x48, "energyScanResultHandler", Response;
	NetworkInit = 0x17, "networkInit", Command;
	NetworkInitExtended = 0x70, "networkInitExtended", Command;
	FormNetwork = 0x1E, "formNetwork", Command;
	JoinNetwork = 0x1F, "joinNetwork", Command;
	LeaveNetwork = 0x20, "leaveNetwork", Command;
	PermitJoining = 0x22, "permitJoining", Command;
	GetNetworkParameters = 0x28, "getNetworkParameters", Command;
	NetworkState = 0x18, "networkState", Command;
	StackStatusHandler = 0x19, "stackStatusHandler", Response;
	SetInitialSecurityState = 0x68, "setInitialSecurityState", Command;
	GetCurrentSecurityState = 0x69, "getCurrentSecurityState", Command;
	GetKey = 0x6A, "getKey", Command;
	BecomeTrustCenter = 0x77, "becomeTrustCenter", Command;
	UnicastNwkKeyUpdate = 0x6B, "unicastNwkKeyUpdate", Command;
	BroadcastNextNetworkKey = 0x73, "broadcastNextNetworkKey", Command;
	BroadcastNetworkKeySwitch = 0x74, "broadcastNetworkKeySwitch", Command;
	ClearKeyTable = 0xB1, "clearKeyTable", Command;
	SendUnicast = 0x34, "sendUnicast", Command;
	MessageSentHandler = 0x3F, "messageSentHandler", Response;
	IncomingMessageHandler = 0x45, "incomingMessageHandler", Response;
	IncomingRouteErrorHandler = 0x80, "incomingRouteErrorHandler", Response;
	ChildJoinHandler = 0x23, "childJoinHandler", Response;
	TrustCenterJoinHandler = 0x24, "trustCenterJoinHandler", Response;
	GetChildData = 0x4A, "getChildData", Command;
	GetParentChildParameters = 0x29, "getParentChildParameters", Command;
	LookupEui64ByNodeId = 0x61, "lookupEui64ByNodeId", Command;
	NeighborCount = 0x7A, "neighborCount", Command;
	ClearBindingTable = 0x2A, "clearBindingTable", Command;
	SetBinding = 0x2D, "setBinding", Command;
	GetBinding = 0x2C, "getBinding", Command;
	SetExtendedTimeout = 0x7E, "setExtendedTimeout", Command;
	GetExtendedTimeout = 0x7F, "getExtendedTimeout", Command;
	Echo = 0x81, "echo", Both;
}
