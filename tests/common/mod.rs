//! Shared test utilities for integration tests.
//!
//! This module provides [`ScriptedGateway`], an in-memory codec gateway
//! fake driven by a [`Script`]: a fixed list of entries, their data blocks,
//! and the status codes each call should report. The fake keeps a
//! [`Ledger`] of handle traffic and call sequencing so tests can assert the
//! session and pump protocols, and materializes disk writes into sparse
//! in-memory images (optionally mirrored to a real directory).
//!
//! Note: `#![allow(dead_code)]` is required because each integration test
//! file compiles as a separate crate and may only use a subset of these
//! helpers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use decant::{DataBlock, EntryKind, Filter, Format, Gateway, RawStatus, WriteFlags};

/// One scripted payload block and the file offset it belongs at.
#[derive(Debug, Clone)]
pub struct ScriptedBlock {
    pub data: Vec<u8>,
    pub offset: u64,
}

/// One entry of a scripted archive.
#[derive(Debug, Clone)]
pub struct ScriptedEntry {
    pub name: String,
    pub size: u64,
    pub kind: EntryKind,
    pub mode: u32,
    pub blocks: Vec<ScriptedBlock>,
    /// Fail `read_data_block` with this code when the given block index is
    /// requested.
    pub fail_read_at: Option<(usize, i32)>,
}

impl ScriptedEntry {
    /// A regular file whose data arrives as one block at offset 0.
    pub fn file(name: &str, data: &[u8]) -> Self {
        Self::with_blocks(name, vec![(0, data.to_vec())])
    }

    /// A regular file with explicit (offset, data) blocks.
    pub fn with_blocks(name: &str, blocks: Vec<(u64, Vec<u8>)>) -> Self {
        let blocks: Vec<ScriptedBlock> = blocks
            .into_iter()
            .map(|(offset, data)| ScriptedBlock { data, offset })
            .collect();
        let size = blocks
            .iter()
            .map(|b| b.offset + b.data.len() as u64)
            .max()
            .unwrap_or(0);
        Self {
            name: name.to_owned(),
            size,
            kind: EntryKind::File,
            mode: 0o644,
            blocks,
            fail_read_at: None,
        }
    }

    /// A directory entry (no data).
    pub fn dir(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            size: 0,
            kind: EntryKind::Directory,
            mode: 0o755,
            blocks: Vec::new(),
            fail_read_at: None,
        }
    }

    /// Fails the read side at the given block index with `code`.
    pub fn fail_read_at(mut self, block: usize, code: i32) -> Self {
        self.fail_read_at = Some((block, code));
        self
    }

    /// The entry's payload as it should appear on disk: blocks assembled
    /// at their offsets, gaps zero-filled.
    pub fn payload(&self) -> Vec<u8> {
        let mut image = Vec::new();
        for block in &self.blocks {
            write_at(&mut image, block.offset, &block.data);
        }
        image
    }
}

/// The behavior plan for a [`ScriptedGateway`].
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub entries: Vec<ScriptedEntry>,
    /// Status for `support_filter` / `support_format` / `open_filename`.
    pub filter_code: i32,
    pub format_code: i32,
    pub open_code: i32,
    /// Fail `next_header` with this code when advancing to the given
    /// entry index.
    pub fail_header_at: Option<(usize, i32)>,
    /// Status for every `write_header` / `write_data_block` /
    /// `finish_entry` call.
    pub write_header_code: i32,
    pub write_block_code: i32,
    pub finish_code: i32,
    /// Mirror disk writes into real files under this directory.
    pub disk_root: Option<PathBuf>,
}

impl Script {
    pub fn with_entries(entries: Vec<ScriptedEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }
}

/// Call accounting kept by the fake.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub read_allocated: u32,
    pub read_released: u32,
    pub write_allocated: u32,
    pub write_released: u32,
    /// Entry indices whose unread data was skipped.
    pub skip_calls: Vec<usize>,
    /// Flags passed to `set_write_options`.
    pub flags: Option<i32>,
    /// Call sequence: `header_read:N`, `header_write:N`, `block_write:N`,
    /// `finish:N`.
    pub events: Vec<String>,
}

struct State {
    script: Script,
    ledger: Ledger,
    /// Sparse in-memory file images keyed by entry pathname.
    disk: BTreeMap<String, Vec<u8>>,
}

/// Archive-read cursor. The scratch buffer stands in for the codec's
/// internal block buffer: reused on every read, which is exactly the
/// validity window [`DataBlock`] encodes.
pub struct FakeRead {
    next: usize,
    current: Option<usize>,
    block: usize,
    scratch: Vec<u8>,
    scratch_offset: u64,
}

/// Entry handle: just the index into the script.
pub struct FakeEntry {
    index: usize,
}

/// Write-to-disk cursor.
pub struct FakeWrite {
    current: Option<usize>,
}

/// An in-memory codec gateway driven by a [`Script`].
#[derive(Clone)]
pub struct ScriptedGateway {
    state: Rc<RefCell<State>>,
}

impl ScriptedGateway {
    pub fn new(script: Script) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                script,
                ledger: Ledger::default(),
                disk: BTreeMap::new(),
            })),
        }
    }

    pub fn with_entries(entries: Vec<ScriptedEntry>) -> Self {
        Self::new(Script::with_entries(entries))
    }

    pub fn ledger(&self) -> Ledger {
        self.state.borrow().ledger.clone()
    }

    /// The in-memory image written for `name`, if any.
    pub fn disk_file(&self, name: &str) -> Option<Vec<u8>> {
        self.state.borrow().disk.get(name).cloned()
    }

    /// Names of all files written, in path order.
    pub fn disk_names(&self) -> Vec<String> {
        self.state.borrow().disk.keys().cloned().collect()
    }
}

/// Writes `data` into `image` at `offset`, zero-filling any gap.
fn write_at(image: &mut Vec<u8>, offset: u64, data: &[u8]) {
    let offset = offset as usize;
    let end = offset + data.len();
    if image.len() < end {
        image.resize(end, 0);
    }
    image[offset..end].copy_from_slice(data);
}

/// Mirrors a block write into a real file under `root`.
fn write_real(root: &Path, name: &str, offset: u64, data: &[u8]) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(path)
        .unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(data).unwrap();
}

impl Gateway for ScriptedGateway {
    type Read = FakeRead;
    type Entry = FakeEntry;
    type Write = FakeWrite;

    fn new_read_handle(&self) -> FakeRead {
        self.state.borrow_mut().ledger.read_allocated += 1;
        FakeRead {
            next: 0,
            current: None,
            block: 0,
            scratch: Vec::new(),
            scratch_offset: 0,
        }
    }

    fn support_filter(&self, _: &mut FakeRead, _: Filter) -> RawStatus {
        RawStatus(self.state.borrow().script.filter_code)
    }

    fn support_format(&self, _: &mut FakeRead, _: Format) -> RawStatus {
        RawStatus(self.state.borrow().script.format_code)
    }

    fn open_filename(&self, _: &mut FakeRead, _: &Path, _: usize) -> RawStatus {
        RawStatus(self.state.borrow().script.open_code)
    }

    fn next_header(&self, handle: &mut FakeRead) -> (RawStatus, Option<FakeEntry>) {
        let mut state = self.state.borrow_mut();
        let index = handle.next;

        if let Some((at, code)) = state.script.fail_header_at {
            if index == at {
                return (RawStatus(code), None);
            }
        }
        if index >= state.script.entries.len() {
            return (RawStatus::EOF, None);
        }

        state.ledger.events.push(format!("header_read:{index}"));
        handle.next += 1;
        handle.current = Some(index);
        handle.block = 0;
        (RawStatus::OK, Some(FakeEntry { index }))
    }

    fn skip_data(&self, handle: &mut FakeRead) -> RawStatus {
        if let Some(index) = handle.current {
            self.state.borrow_mut().ledger.skip_calls.push(index);
        }
        RawStatus::OK
    }

    fn read_data_block<'a>(&self, handle: &'a mut FakeRead) -> (RawStatus, Option<DataBlock<'a>>) {
        let state = self.state.borrow();
        let Some(index) = handle.current else {
            return (RawStatus::EOF, None);
        };
        let entry = &state.script.entries[index];

        if let Some((at, code)) = entry.fail_read_at {
            if handle.block == at {
                return (RawStatus(code), None);
            }
        }
        let Some(block) = entry.blocks.get(handle.block) else {
            return (RawStatus::EOF, None);
        };

        handle.scratch.clear();
        handle.scratch.extend_from_slice(&block.data);
        handle.scratch_offset = block.offset;
        handle.block += 1;
        drop(state);

        (
            RawStatus::OK,
            Some(DataBlock {
                data: &handle.scratch,
                offset: handle.scratch_offset,
            }),
        )
    }

    fn release_read(&self, _: FakeRead) {
        self.state.borrow_mut().ledger.read_released += 1;
    }

    fn entry_pathname(&self, entry: &FakeEntry) -> String {
        self.state.borrow().script.entries[entry.index].name.clone()
    }

    fn entry_size(&self, entry: &FakeEntry) -> u64 {
        self.state.borrow().script.entries[entry.index].size
    }

    fn entry_kind(&self, entry: &FakeEntry) -> EntryKind {
        self.state.borrow().script.entries[entry.index].kind
    }

    fn entry_mode(&self, entry: &FakeEntry) -> u32 {
        self.state.borrow().script.entries[entry.index].mode
    }

    fn new_write_handle(&self) -> FakeWrite {
        self.state.borrow_mut().ledger.write_allocated += 1;
        FakeWrite { current: None }
    }

    fn set_write_options(&self, _: &mut FakeWrite, flags: WriteFlags) {
        self.state.borrow_mut().ledger.flags = Some(flags.bits());
    }

    fn write_header(&self, handle: &mut FakeWrite, entry: &FakeEntry) -> RawStatus {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let code = state.script.write_header_code;
        if code != 0 {
            return RawStatus(code);
        }

        state.ledger.events.push(format!("header_write:{}", entry.index));
        let scripted = &state.script.entries[entry.index];
        if scripted.kind == EntryKind::File {
            // Materialize zero-byte files at header time, like a real
            // write-disk handle creating the file before any data arrives.
            let name = scripted.name.clone();
            if let Some(root) = state.script.disk_root.clone() {
                write_real(&root, &name, 0, &[]);
            }
            state.disk.entry(name).or_default();
        }
        handle.current = Some(entry.index);
        RawStatus::OK
    }

    fn write_data_block(&self, handle: &mut FakeWrite, data: &[u8], offset: u64) -> RawStatus {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let code = state.script.write_block_code;
        if code != 0 {
            return RawStatus(code);
        }
        let Some(index) = handle.current else {
            return RawStatus(-30);
        };

        state.ledger.events.push(format!("block_write:{index}"));
        let name = state.script.entries[index].name.clone();
        if let Some(root) = state.script.disk_root.clone() {
            write_real(&root, &name, offset, data);
        }
        let image = state.disk.entry(name).or_default();
        write_at(image, offset, data);
        RawStatus::OK
    }

    fn finish_entry(&self, handle: &mut FakeWrite) -> RawStatus {
        let mut state = self.state.borrow_mut();
        let code = state.script.finish_code;
        if code != 0 {
            return RawStatus(code);
        }
        if let Some(index) = handle.current.take() {
            state.ledger.events.push(format!("finish:{index}"));
        }
        RawStatus::OK
    }

    fn release_write(&self, _: FakeWrite) {
        self.state.borrow_mut().ledger.write_released += 1;
    }
}
