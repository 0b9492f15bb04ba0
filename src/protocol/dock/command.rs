//! Dock command codes.
//!
//! Wire commands are four ASCII characters read as a big-endian `u32`.
//! Values up to [`DockCommand::LAST_APP_COMMAND`] never reach the wire: they
//! are signals exchanged between the session layer and application modules.
use core::fmt;

/// 32-bit Dock command code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DockCommand(pub u32);

impl DockCommand {
    /// Command whose code spells `code` in ASCII.
    pub const fn from_fourcc(code: &[u8; 4]) -> Self {
        Self(u32::from_be_bytes(*code))
    }

    pub const fn to_fourcc(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// `true` for internal signals that must not be sent to the Newton.
    pub const fn is_internal(self) -> bool {
        self.0 <= Self::LAST_APP_COMMAND.0
    }

    //==================================================================================Internal signals
    pub const APP_DATA: Self = Self(0x01);
    pub const APP_QUIT: Self = Self(0x02);
    pub const APP_DISCONNECT: Self = Self(0x03);
    pub const APP_GET_DEFAULT_STORE: Self = Self(0x04);
    pub const APP_GET_STORE_NAMES: Self = Self(0x05);
    pub const APP_QUERY_SOUP: Self = Self(0x06);
    pub const APP_CURSOR_FREE: Self = Self(0x07);
    pub const APP_CURSOR_NEXT: Self = Self(0x08);
    pub const APP_CURSOR_ENTRY: Self = Self(0x09);
    pub const APP_SET_CURRENT_STORE: Self = Self(0x0A);
    pub const APP_SET_CURRENT_SOUP: Self = Self(0x0B);
    pub const APP_GET_SOUP_NAMES: Self = Self(0x0C);
    pub const APP_DELETE_ENTRIES: Self = Self(0x0D);
    pub const APP_ADD_ENTRY: Self = Self(0x0E);
    pub const APP_SEND_SOUP: Self = Self(0x0F);
    pub const APP_GET_INFO: Self = Self(0x10);
    /// Session is up; application modules may start talking.
    pub const APP_CONNECTED: Self = Self(0x11);
    pub const LAST_APP_COMMAND: Self = Self(0x3232_3232);

    //==================================================================================Wire commands
    pub const LONGDATA: Self = Self::from_fourcc(b"ldta");
    pub const REF_RESULT: Self = Self::from_fourcc(b"ref ");
    pub const QUERY: Self = Self::from_fourcc(b"qury");
    pub const CURSOR_GOTO_KEY: Self = Self::from_fourcc(b"goto");
    pub const CURSOR_MAP: Self = Self::from_fourcc(b"cmap");
    pub const CURSOR_ENTRY: Self = Self::from_fourcc(b"crsr");
    pub const CURSOR_MOVE: Self = Self::from_fourcc(b"move");
    pub const CURSOR_NEXT: Self = Self::from_fourcc(b"next");
    pub const CURSOR_PREV: Self = Self::from_fourcc(b"prev");
    pub const CURSOR_RESET: Self = Self::from_fourcc(b"rset");
    pub const CURSOR_RESET_TO_END: Self = Self::from_fourcc(b"rend");
    pub const CURSOR_COUNT_ENTRIES: Self = Self::from_fourcc(b"cnt ");
    pub const CURSOR_WHICH_END: Self = Self::from_fourcc(b"whch");
    pub const CURSOR_FREE: Self = Self::from_fourcc(b"cfre");
    pub const KEYBOARD_CHAR: Self = Self::from_fourcc(b"kbdc");
    pub const DESKTOP_INFO: Self = Self::from_fourcc(b"dinf");
    pub const KEYBOARD_STRING: Self = Self::from_fourcc(b"kbds");
    pub const START_KEYBOARD_PASSTHROUGH: Self = Self::from_fourcc(b"kybd");
    pub const DEFAULT_STORE: Self = Self::from_fourcc(b"dfst");
    pub const APP_NAMES: Self = Self::from_fourcc(b"appn");
    pub const IMPORT_PARAMETER_SLIP_RESULT: Self = Self::from_fourcc(b"islr");
    pub const PACKAGE_INFO: Self = Self::from_fourcc(b"pinf");
    pub const SET_BASE_ID: Self = Self::from_fourcc(b"base");
    pub const BACKUP_IDS: Self = Self::from_fourcc(b"bids");
    pub const BACKUP_SOUP_DONE: Self = Self::from_fourcc(b"bsdn");
    pub const SOUP_NOT_DIRTY: Self = Self::from_fourcc(b"ndir");
    pub const SYNCHRONIZE: Self = Self::from_fourcc(b"sync");
    pub const CALL_RESULT: Self = Self::from_fourcc(b"cres");
    pub const REMOVE_PACKAGE: Self = Self::from_fourcc(b"rmvp");
    pub const RESULT_STRING: Self = Self::from_fourcc(b"ress");
    pub const SOURCE_VERSION: Self = Self::from_fourcc(b"sver");
    pub const ADD_ENTRY_WITH_UNIQUE_ID: Self = Self::from_fourcc(b"auni");
    pub const GET_PACKAGE_INFO: Self = Self::from_fourcc(b"gpin");
    pub const GET_DEFAULT_STORE: Self = Self::from_fourcc(b"gdfs");
    pub const CREATE_DEFAULT_SOUP: Self = Self::from_fourcc(b"cdsp");
    pub const GET_APP_NAMES: Self = Self::from_fourcc(b"gapp");
    pub const REG_PROTOCOL_EXTENSION: Self = Self::from_fourcc(b"pext");
    pub const REMOVE_PROTOCOL_EXTENSION: Self = Self::from_fourcc(b"rpex");
    pub const SET_STORE_SIGNATURE: Self = Self::from_fourcc(b"ssig");
    pub const SET_SOUP_SIGNATURE: Self = Self::from_fourcc(b"ssos");
    pub const IMPORT_PARAMETERS_SLIP: Self = Self::from_fourcc(b"islp");
    pub const GET_PASSWORD: Self = Self::from_fourcc(b"gpwd");
    pub const SEND_SOUP: Self = Self::from_fourcc(b"snds");
    pub const BACKUP_SOUP: Self = Self::from_fourcc(b"bksp");
    pub const SET_STORE_NAME: Self = Self::from_fourcc(b"ssna");
    pub const CALL_GLOBAL_FUNCTION: Self = Self::from_fourcc(b"cgfn");
    pub const CALL_ROOT_METHOD: Self = Self::from_fourcc(b"crmd");
    pub const SET_VBO_COMPRESSION: Self = Self::from_fourcc(b"cvbo");
    pub const RESTORE_PATCH: Self = Self::from_fourcc(b"rpat");
    pub const OPERATION_DONE: Self = Self::from_fourcc(b"opdn");
    pub const OPERATION_CANCELED: Self = Self::from_fourcc(b"opca");
    pub const OP_CANCELED_ACK: Self = Self::from_fourcc(b"ocaa");
    pub const REF_TEST: Self = Self::from_fourcc(b"rtst");
    pub const UNKNOWN_COMMAND: Self = Self::from_fourcc(b"unkn");
    pub const PASSWORD: Self = Self::from_fourcc(b"pass");
    pub const NEWTON_NAME: Self = Self::from_fourcc(b"name");
    pub const NEWTON_INFO: Self = Self::from_fourcc(b"ninf");
    pub const INITIATE_DOCKING: Self = Self::from_fourcc(b"dock");
    pub const WHICH_ICONS: Self = Self::from_fourcc(b"wicn");
    pub const REQUEST_TO_SYNC: Self = Self::from_fourcc(b"ssyn");
    pub const SYNC_OPTIONS: Self = Self::from_fourcc(b"sopt");
    pub const GET_SYNC_OPTIONS: Self = Self::from_fourcc(b"gsyn");
    pub const SYNC_RESULTS: Self = Self::from_fourcc(b"sres");
    pub const SET_STORE_GET_NAMES: Self = Self::from_fourcc(b"ssgn");
    pub const SET_SOUP_GET_INFO: Self = Self::from_fourcc(b"ssgi");
    pub const GET_CHANGED_INDEX: Self = Self::from_fourcc(b"cidx");
    pub const GET_CHANGED_INFO: Self = Self::from_fourcc(b"cinf");
    pub const REQUEST_TO_BROWSE: Self = Self::from_fourcc(b"rtbr");
    pub const GET_DEVICES: Self = Self::from_fourcc(b"gdev");
    pub const GET_DEFAULT_PATH: Self = Self::from_fourcc(b"dpth");
    pub const GET_FILES_AND_FOLDERS: Self = Self::from_fourcc(b"gfil");
    pub const SET_PATH: Self = Self::from_fourcc(b"spth");
    pub const GET_FILE_INFO: Self = Self::from_fourcc(b"gfin");
    pub const INTERNAL_STORE: Self = Self::from_fourcc(b"isto");
    pub const RESOLVE_ALIAS: Self = Self::from_fourcc(b"rali");
    pub const GET_FILTERS: Self = Self::from_fourcc(b"gflt");
    pub const SET_FILTER: Self = Self::from_fourcc(b"sflt");
    pub const SET_DRIVE: Self = Self::from_fourcc(b"sdrv");
    pub const DEVICES: Self = Self::from_fourcc(b"devs");
    pub const FILTERS: Self = Self::from_fourcc(b"filt");
    pub const PATH: Self = Self::from_fourcc(b"path");
    pub const FILES_AND_FOLDERS: Self = Self::from_fourcc(b"file");
    pub const FILE_INFO: Self = Self::from_fourcc(b"finf");
    pub const GET_INTERNAL_STORE: Self = Self::from_fourcc(b"gist");
    pub const ALIAS_RESOLVED: Self = Self::from_fourcc(b"alir");
    pub const IMPORT_FILE: Self = Self::from_fourcc(b"impt");
    pub const SET_TRANSLATOR: Self = Self::from_fourcc(b"tran");
    pub const TRANSLATOR_LIST: Self = Self::from_fourcc(b"trnl");
    pub const IMPORTING: Self = Self::from_fourcc(b"dimp");
    pub const SOUPS_CHANGED: Self = Self::from_fourcc(b"schg");
    pub const SET_STORE_TO_DEFAULT: Self = Self::from_fourcc(b"sdef");
    pub const LOAD_PACKAGE_FILE: Self = Self::from_fourcc(b"lpfl");
    pub const RESTORE_FILE: Self = Self::from_fourcc(b"rsfl");
    pub const GET_RESTORE_OPTIONS: Self = Self::from_fourcc(b"grop");
    pub const RESTORE_ALL: Self = Self::from_fourcc(b"rall");
    pub const RESTORE_OPTIONS: Self = Self::from_fourcc(b"ropt");
    pub const RESTORE_PACKAGE: Self = Self::from_fourcc(b"rpkg");
    pub const REQUEST_TO_RESTORE: Self = Self::from_fourcc(b"rrst");
    pub const REQUEST_TO_INSTALL: Self = Self::from_fourcc(b"rins");
    pub const REQUEST_TO_DOCK: Self = Self::from_fourcc(b"rtdk");
    pub const CURRENT_TIME: Self = Self::from_fourcc(b"time");
    pub const STORE_NAMES: Self = Self::from_fourcc(b"stor");
    pub const SOUP_NAMES: Self = Self::from_fourcc(b"soup");
    pub const SOUP_IDS: Self = Self::from_fourcc(b"sids");
    pub const CHANGED_IDS: Self = Self::from_fourcc(b"cids");
    pub const RESULT: Self = Self::from_fourcc(b"dres");
    pub const ADDED_ID: Self = Self::from_fourcc(b"adid");
    pub const ENTRY: Self = Self::from_fourcc(b"entr");
    pub const PACKAGE_ID_LIST: Self = Self::from_fourcc(b"pids");
    pub const PACKAGE: Self = Self::from_fourcc(b"apkg");
    pub const INDEX_DESCRIPTION: Self = Self::from_fourcc(b"indx");
    pub const INHERITANCE: Self = Self::from_fourcc(b"dinh");
    pub const PATCHES: Self = Self::from_fourcc(b"patc");
    pub const LAST_SYNC_TIME: Self = Self::from_fourcc(b"stme");
    pub const GET_STORE_NAMES: Self = Self::from_fourcc(b"gsto");
    pub const GET_SOUP_NAMES: Self = Self::from_fourcc(b"gets");
    pub const SET_CURRENT_STORE: Self = Self::from_fourcc(b"ssto");
    pub const SET_CURRENT_SOUP: Self = Self::from_fourcc(b"ssou");
    pub const GET_SOUP_IDS: Self = Self::from_fourcc(b"gids");
    pub const DELETE_ENTRIES: Self = Self::from_fourcc(b"dele");
    pub const ADD_ENTRY: Self = Self::from_fourcc(b"adde");
    pub const RETURN_ENTRY: Self = Self::from_fourcc(b"rete");
    pub const RETURN_CHANGED_ENTRY: Self = Self::from_fourcc(b"rcen");
    pub const EMPTY_SOUP: Self = Self::from_fourcc(b"esou");
    pub const DELETE_SOUP: Self = Self::from_fourcc(b"dsou");
    pub const LOAD_PACKAGE: Self = Self::from_fourcc(b"lpkg");
    pub const GET_PACKAGE_IDS: Self = Self::from_fourcc(b"gpid");
    pub const BACKUP_PACKAGES: Self = Self::from_fourcc(b"bpkg");
    pub const DISCONNECT: Self = Self::from_fourcc(b"disc");
    pub const DELETE_ALL_PACKAGES: Self = Self::from_fourcc(b"dpkg");
    pub const GET_INDEX_DESCRIPTION: Self = Self::from_fourcc(b"gind");
    pub const CREATE_SOUP: Self = Self::from_fourcc(b"csop");
    pub const GET_INHERITANCE: Self = Self::from_fourcc(b"ginh");
    pub const SET_TIMEOUT: Self = Self::from_fourcc(b"stim");
    pub const GET_PATCHES: Self = Self::from_fourcc(b"gpat");
    pub const DELETE_PKG_DIR: Self = Self::from_fourcc(b"dpkd");
    pub const GET_SOUP_INFO: Self = Self::from_fourcc(b"gsin");
    pub const CHANGED_ENTRY: Self = Self::from_fourcc(b"cent");
    pub const TEST: Self = Self::from_fourcc(b"test");
    pub const HELLO: Self = Self::from_fourcc(b"helo");
    pub const SOUP_INFO: Self = Self::from_fourcc(b"sinf");
}

impl fmt::Display for DockCommand {
    /// Wire commands print as their four characters, internal ones as `app:N`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_internal() {
            return write!(f, "app:{}", self.0);
        }
        for byte in self.to_fourcc() {
            let c = if byte.is_ascii_graphic() || byte == b' ' {
                char::from(byte)
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl From<u32> for DockCommand {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
