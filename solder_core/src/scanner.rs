use std::ops::Range;

use logos::Logos;

/// Raw tokens produced by logos for flat tokenization of plugin source text.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("--[[")]
	LongCommentOpen,
	#[token("]]")]
	LongCommentClose,
	#[token("#include")]
	IncludeKeyword,
	#[token("#encode")]
	EncodeKeyword,
	/// A double quoted path on a single line. An unterminated quote never
	/// matches, so broken directives fall through as literal text.
	#[regex(r#""[^"\n]*""#)]
	QuotedPath,
	#[token("\n")]
	Newline,
	#[regex(r"[ \t\r]+")]
	Whitespace,
}

/// The two directive kinds recognized inside Lua long comments.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DirectiveKind {
	/// `--[[ #include "path" ]]`: splice another source file in place.
	Include,
	/// `--[[ #encode "path" ]]`: inline a binary asset as base64.
	Encode,
}

/// A located directive occurrence within a source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch {
	pub kind: DirectiveKind,
	/// The referenced path exactly as written between the quotes.
	pub path: String,
	/// Byte span of the full directive, `--[[` through `]]`.
	pub span: Range<usize>,
	/// 1-indexed line of the opening token.
	pub line: usize,
}

/// Expectation states for the state machine that drives directive matching.
///
/// The directive grammar is flat (open, keyword, quoted path, close, with
/// optional whitespace between each), so a single expectation slot replaces
/// a full context stack. Any token that breaks the expected sequence
/// abandons the candidate and is re-examined at top level, leaving the
/// surrounding text untouched.
enum ScanContext {
	/// Outside any directive candidate.
	Outside,
	/// Inside `--[[`, expecting the directive keyword.
	Keyword,
	/// Keyword seen, expecting the quoted path.
	Path,
	/// Path seen, expecting `]]`.
	Close,
}

/// Walks the logos token stream with context-dependent rules, collecting
/// `DirectiveMatch` objects.
struct DirectiveWalker<'a> {
	/// The source text being scanned.
	source: &'a str,
	/// The collected raw tokens and their byte spans.
	raw_tokens: Vec<(Result<RawToken, ()>, Range<usize>)>,
	/// Current index into `raw_tokens`.
	cursor: usize,
	/// The current expectation state.
	context: ScanContext,
	/// Byte offset of the current candidate's `--[[` token.
	candidate_start: usize,
	/// Directive kind of the current candidate, once the keyword is seen.
	candidate_kind: Option<DirectiveKind>,
	/// Referenced path of the current candidate, once the path is seen.
	candidate_path: Option<String>,
	/// Pre-computed line table for offset-to-line conversion.
	line_table: LineTable,
	/// Collected valid matches, in source order.
	matches: Vec<DirectiveMatch>,
}

impl<'a> DirectiveWalker<'a> {
	fn new(source: &'a str) -> Self {
		let raw_tokens: Vec<_> = RawToken::lexer(source).spanned().collect();

		Self {
			source,
			raw_tokens,
			cursor: 0,
			context: ScanContext::Outside,
			candidate_start: 0,
			candidate_kind: None,
			candidate_path: None,
			line_table: LineTable::new(source),
			matches: vec![],
		}
	}

	/// Get the text slice for the current raw token.
	fn current_slice(&self) -> &'a str {
		let (_, span) = &self.raw_tokens[self.cursor];
		&self.source[span.clone()]
	}

	/// Abandon the current candidate without consuming the current token, so
	/// it is re-examined in the `Outside` context. A `--[[` that interrupted
	/// a half-formed directive can then open a fresh candidate.
	fn abandon_candidate(&mut self) {
		self.context = ScanContext::Outside;
		self.candidate_kind = None;
		self.candidate_path = None;
	}

	/// Finalize the current candidate as a match ending at `close_end`.
	fn push_match(&mut self, close_end: usize) {
		let (Some(kind), Some(path)) = (self.candidate_kind, self.candidate_path.take()) else {
			self.abandon_candidate();
			return;
		};

		self.matches.push(DirectiveMatch {
			kind,
			path,
			span: self.candidate_start..close_end,
			line: self.line_table.offset_to_line(self.candidate_start),
		});
		self.abandon_candidate();
	}

	/// Main processing loop: walk the raw token stream with context-dependent
	/// rules. Every token advances the cursor in the `Outside` context, so
	/// abandoned candidates cannot loop.
	fn process(&mut self) {
		while self.cursor < self.raw_tokens.len() {
			let (result, span) = &self.raw_tokens[self.cursor];
			let span = span.clone();

			// Unrecognized bytes close off any half-formed candidate; outside
			// a candidate they are simply skipped.
			let Ok(raw) = result else {
				if !matches!(self.context, ScanContext::Outside) {
					self.abandon_candidate();
				}
				self.cursor += 1;
				continue;
			};

			match self.context {
				ScanContext::Outside => {
					if matches!(raw, RawToken::LongCommentOpen) {
						self.context = ScanContext::Keyword;
						self.candidate_start = span.start;
					}
					self.cursor += 1;
				}
				ScanContext::Keyword => {
					match raw {
						RawToken::IncludeKeyword => {
							self.candidate_kind = Some(DirectiveKind::Include);
							self.context = ScanContext::Path;
							self.cursor += 1;
						}
						RawToken::EncodeKeyword => {
							self.candidate_kind = Some(DirectiveKind::Encode);
							self.context = ScanContext::Path;
							self.cursor += 1;
						}
						RawToken::Whitespace | RawToken::Newline => {
							self.cursor += 1;
						}
						_ => {
							self.abandon_candidate();
						}
					}
				}
				ScanContext::Path => {
					match raw {
						RawToken::QuotedPath => {
							let slice = self.current_slice();
							self.candidate_path = Some(slice[1..slice.len() - 1].to_string());
							self.context = ScanContext::Close;
							self.cursor += 1;
						}
						RawToken::Whitespace | RawToken::Newline => {
							self.cursor += 1;
						}
						_ => {
							self.abandon_candidate();
						}
					}
				}
				ScanContext::Close => {
					match raw {
						RawToken::LongCommentClose => {
							self.push_match(span.end);
							self.cursor += 1;
						}
						RawToken::Whitespace | RawToken::Newline => {
							self.cursor += 1;
						}
						_ => {
							self.abandon_candidate();
						}
					}
				}
			}
		}
	}
}

/// Scan a source buffer for directive occurrences in a single left-to-right
/// pass. Malformed candidates (missing quotes, unterminated quotes, an
/// unknown keyword, a missing `]]`) produce no match and no error; the text
/// is left exactly as written.
pub fn scan_directives(source: &str) -> Vec<DirectiveMatch> {
	let mut walker = DirectiveWalker::new(source);
	walker.process();
	walker.matches
}

/// Pre-computed table of line-start byte offsets for efficient
/// offset-to-line conversion. Built once per buffer (O(n)), then each lookup
/// is a binary search (O(log n)).
pub(crate) struct LineTable {
	/// Byte offsets of the start of each line. `line_starts[0]` is always 0.
	line_starts: Vec<usize>,
}

impl LineTable {
	pub(crate) fn new(content: &str) -> Self {
		let mut line_starts = vec![0];
		for (i, byte) in content.bytes().enumerate() {
			if byte == b'\n' {
				line_starts.push(i + 1);
			}
		}
		Self { line_starts }
	}

	/// Convert a byte offset to a 1-indexed line number.
	pub(crate) fn offset_to_line(&self, offset: usize) -> usize {
		let line_idx = match self.line_starts.binary_search(&offset) {
			Ok(exact) => exact,
			Err(insert) => insert.saturating_sub(1),
		};
		line_idx + 1
	}
}

pub(crate) fn memstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}
