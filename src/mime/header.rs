//-
// Copyright (c) 2026, Jason Lingle
//
// This file is part of maildir-mbox.
//
// maildir-mbox is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// maildir-mbox is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along with
// maildir-mbox. If not, see <http://www.gnu.org/licenses/>.

//! Parsers for the address syntax of RFC 5322 header fields.
//!
//! Only the subset needed to pick an envelope sender out of a message is
//! implemented: single mailboxes, with or without display names, and the
//! angle-bracketed form used by `Return-Path`. Obsolete routes and groups are
//! not recognised.

use std::borrow::Cow;

use nom::{
    branch::alt,
    bytes::complete::{is_a, is_not, take, take_while1},
    character::complete::char,
    combinator::{map, opt},
    multi::{many0, separated_nonempty_list},
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use super::model::*;

// RFC 2822 3.2.2 "quoted-pair"
fn quoted_pair(i: &[u8]) -> IResult<&[u8], &[u8]> {
    preceded(char('\\'), take(1usize))(i)
}

// RFC 2822 3.2.3 "Folding white space", collapsed to a single space
fn fws(i: &[u8]) -> IResult<&[u8], &[u8]> {
    map(is_a(&b" \t\r\n"[..]), |_| &b" "[..])(i)
}

// RFC 2822 3.2.3 "Comment text"
fn ctext(i: &[u8]) -> IResult<&[u8], &[u8]> {
    is_not(&b"()\\ \t\r\n"[..])(i)
}

// RFC 2822 3.2.3 "Comment content"
fn ccontent(i: &[u8]) -> IResult<&[u8], ()> {
    alt((
        map(ctext, |_| ()),
        map(quoted_pair, |_| ()),
        map(fws, |_| ()),
        comment,
    ))(i)
}

// RFC 2822 3.2.3 "Comment". Note it is recursive.
fn comment(i: &[u8]) -> IResult<&[u8], ()> {
    map(delimited(char('('), many0(ccontent), char(')')), |_| ())(i)
}

// RFC 2822 3.2.3 "Comment or folding white space"
fn cfws(i: &[u8]) -> IResult<&[u8], ()> {
    map(many0(alt((map(fws, |_| ()), comment))), |_| ())(i)
}

fn is_atext(ch: u8) -> bool {
    // RFC 2822 ALPHA / DIGIT
    ch.is_ascii_alphanumeric() ||
        // RFC 2822 non-specials
        b"!#$%&'*+-/=?^_`{|}~".contains(&ch) ||
        // RFC 6532 Unicode
        ch >= 0x80
}

// RFC 2822 3.2.4 "Atom text"
// Amended by RFC 6532 to include all non-ASCII characters
fn atext(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(is_atext)(i)
}

// RFC 2822 3.2.4 "Atom"
fn atom(i: &[u8]) -> IResult<&[u8], &[u8]> {
    delimited(opt(cfws), atext, opt(cfws))(i)
}

// RFC 2822 3.2.5 "Quoted [string] text"
fn qtext(i: &[u8]) -> IResult<&[u8], &[u8]> {
    is_not(&b" \t\r\n\\\""[..])(i)
}

// RFC 2822 3.2.5 "Quoted [string] content"
fn qcontent(i: &[u8]) -> IResult<&[u8], &[u8]> {
    alt((qtext, quoted_pair, fws))(i)
}

// RFC 2822 3.2.5 "Quoted string"
fn quoted_string<'a>(i: &'a [u8]) -> IResult<&'a [u8], Cow<'a, [u8]>> {
    let (i, _) = pair(opt(cfws), char('"'))(i)?;
    let (i, pieces) = many0(qcontent)(i)?;
    let (i, _) = pair(char('"'), opt(cfws))(i)?;

    let mut content: Cow<'a, [u8]> = Cow::Borrowed(&[][..]);
    for piece in pieces {
        if content.is_empty() {
            content = Cow::Borrowed(piece);
        } else {
            content.to_mut().extend_from_slice(piece);
        }
    }

    Ok((i, content))
}

// RFC 2822 3.2.6 "word"
fn word(i: &[u8]) -> IResult<&[u8], Cow<'_, [u8]>> {
    alt((map(atom, Cow::Borrowed), quoted_string))(i)
}

// Not formally specified by RFC 2822, but part of the `obs-phrase` grammar.
fn obs_dot(i: &[u8]) -> IResult<&[u8], Cow<'_, [u8]>> {
    // Only need to handle CFWS at end since there is always a preceding token
    // that allows CFWS.
    terminated(map(char('.'), |_| Cow::Borrowed(&b"."[..])), opt(cfws))(i)
}

// RFC 2822 3.2.6 "phrase", plus "obsolete phrase" syntax which accounts
// for dots in unquoted display names
fn phrase(i: &[u8]) -> IResult<&[u8], Vec<Cow<'_, [u8]>>> {
    map(pair(word, many0(alt((word, obs_dot)))), |(head, mut tail)| {
        tail.insert(0, head);
        tail
    })(i)
}

// RFC 2822 3.4.1 local part of address
fn local_part(i: &[u8]) -> IResult<&[u8], Vec<Cow<'_, [u8]>>> {
    separated_nonempty_list(char('.'), word)(i)
}

// RFC 2822 4.4 obsolete domain format
fn obs_domain(i: &[u8]) -> IResult<&[u8], Vec<Cow<'_, [u8]>>> {
    separated_nonempty_list(char('.'), map(atom, Cow::Borrowed))(i)
}

// RFC 2822 3.4.1 domain name text
fn dtext(i: &[u8]) -> IResult<&[u8], &[u8]> {
    is_not(&b"[]\\ \t\r\n"[..])(i)
}

// RFC 2822 3.4.1 domain literal
fn domain_literal(i: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let (i, _) = pair(opt(cfws), char('['))(i)?;
    let (i, pieces) = many0(alt((dtext, quoted_pair, fws)))(i)?;
    let (i, _) = pair(char(']'), opt(cfws))(i)?;

    let mut literal = vec![b'['];
    for piece in pieces {
        literal.extend_from_slice(piece);
    }
    literal.push(b']');
    Ok((i, literal))
}

// RFC 2822 3.4.1 domain
fn domain(i: &[u8]) -> IResult<&[u8], Vec<Cow<'_, [u8]>>> {
    alt((
        obs_domain,
        map(domain_literal, |v| vec![Cow::Owned(v)]),
    ))(i)
}

// RFC 2822 3.4.1 address specification
fn addr_spec(i: &[u8]) -> IResult<&[u8], AddrSpec<'_>> {
    map(
        pair(local_part, preceded(char('@'), domain)),
        |(local, domain)| AddrSpec { local, domain },
    )(i)
}

// RFC 2822 3.4 angle-delimited address
fn angle_addr(i: &[u8]) -> IResult<&[u8], AddrSpec<'_>> {
    delimited(
        pair(opt(cfws), char('<')),
        addr_spec,
        pair(char('>'), opt(cfws)),
    )(i)
}

// RFC 2822 3.4 mailbox
fn mailbox(i: &[u8]) -> IResult<&[u8], MailboxSpec<'_>> {
    map(
        alt((
            pair(opt(phrase), angle_addr),
            map(addr_spec, |a| (None, a)),
        )),
        |(name, addr)| MailboxSpec {
            name: name.unwrap_or_default(),
            addr,
        },
    )(i)
}

/// Parse the first mailbox of an address list such as the value of `From`.
///
/// Anything after the first mailbox is ignored.
pub fn parse_first_mailbox(value: &[u8]) -> Option<MailboxSpec<'_>> {
    preceded(many0(pair(opt(cfws), char(','))), mailbox)(value)
        .ok()
        .map(|(_, mailbox)| mailbox)
}

/// Parse the value of a `Return-Path` header.
///
/// The null reverse-path `<>` does not name an address and yields `None`.
pub fn parse_return_path(value: &[u8]) -> Option<AddrSpec<'_>> {
    angle_addr(value).ok().map(|(_, addr)| addr)
}
