//! Windows 命令行参数的引号转义与拆分。
//!
//! 用途：
//! - 提权重启时把原始参数重新拼成一条命令行
//! - 把注册表中的 `UninstallString` / `QuietUninstallString` 拆成程序与参数
//!
//! 规则与 MSVC 运行时一致：反斜杠只有紧挨双引号时才是转义。
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

/// 为单个参数加引号（仅在需要时）。
pub fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains([' ', '\t', '\n', '"']) {
        return arg.to_string();
    }
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    let mut backslashes = 0usize;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                out.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.extend(std::iter::repeat('\\').take(backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }
    // 结尾的反斜杠后面紧跟闭合引号，需要加倍。
    out.extend(std::iter::repeat('\\').take(backslashes * 2));
    out.push('"');
    out
}

/// 把多个参数拼成一条命令行。
pub fn join_args<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|a| quote_arg(a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 把一条命令行拆分为参数列表（第一个元素为程序）。
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut in_quotes = false;
    let mut backslashes = 0usize;

    for c in line.chars() {
        match c {
            '\\' => {
                backslashes += 1;
                in_arg = true;
            }
            '"' => {
                current.extend(std::iter::repeat('\\').take(backslashes / 2));
                if backslashes % 2 == 1 {
                    current.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
                backslashes = 0;
                in_arg = true;
            }
            ' ' | '\t' if !in_quotes => {
                current.extend(std::iter::repeat('\\').take(backslashes));
                backslashes = 0;
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            _ => {
                current.extend(std::iter::repeat('\\').take(backslashes));
                backslashes = 0;
                current.push(c);
                in_arg = true;
            }
        }
    }
    current.extend(std::iter::repeat('\\').take(backslashes));
    if in_arg {
        args.push(current);
    }
    args
}
