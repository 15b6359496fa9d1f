//! Plausible fake values, chosen by what a column header means.
//!
//! A header is mapped to a [`Kind`] once per file (exact enumerations
//! first, then keyword rules), and every row draws a fresh value of that
//! kind. Names, addresses, companies, contact details, prose and dates come
//! from `fake`'s zh_CN locale; the tables here cover the domain
//! enumerations and the identifiers that carry check digits.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc};
use fake::Fake;
use fake::faker::address::raw::{CityName, StateName, StreetName};
use fake::faker::chrono::raw::DateTimeBetween;
use fake::faker::company::raw::CompanyName;
use fake::faker::internet::raw::{DomainSuffix, FreeEmail, MACAddress};
use fake::faker::lorem::raw::{Sentence, Word};
use fake::faker::name::raw::Name;
use fake::faker::number::raw::NumberWithFormat;
use fake::faker::phone_number::raw::CellNumber;
use fake::locales::{EN, ZH_CN};
use fake::uuid::UUIDv4;
use rand::Rng;

/// What a column holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kind {
    Choice(&'static [&'static str]),
    Number { min: f64, max: f64, decimals: usize },
    Money { min: f64, max: f64 },
    Percent,
    PersonName,
    Phone,
    IdNumber,
    Email,
    Mac,
    Imei,
    Imsi,
    AndroidId,
    Uuid,
    Url,
    Longitude,
    Latitude,
    Vin,
    StockCode,
    CreditCode,
    Ean13,
    LicensePlate,
    BankAccount,
    Date,
    Birthday,
    DateTime,
    Timestamp,
    Validity,
    Quarter,
    Company,
    Issuer,
    Hotel,
    Education,
    /// Digit template: `#` is any digit.
    Format(&'static str),
    Address,
    City,
    Province,
    Code,
    Text,
}

// ── Vocabularies ──

const ID_REGIONS: &[&str] = &["110101", "310104", "440106", "330106", "510107", "420102", "610113"];
const PLATE_PROVINCES: &[&str] = &["京", "沪", "粤", "浙", "苏", "川", "鄂", "陕"];

const DISEASES: &[&str] = &[
    "急性上呼吸道感染", "高血压", "II型糖尿病", "肺炎", "急性阑尾炎", "慢性胃炎", "冠状动脉心脏病", "过敏性鼻炎",
];
const ECOMMERCE_ACTIONS: &[&str] = &[
    "浏览商品", "搜索关键词", "添加至购物车", "提交订单", "完成支付", "发表评论", "申请退款",
];
const YES_NO: &[&str] = &["有", "无"];
const BOOLEANS: &[&str] = &["true", "false"];
const GRADES: &[&str] = &["优", "良", "中"];
const INDUSTRIES: &[&str] = &["互联网", "制造业", "金融", "医疗健康", "零售", "能源", "教育"];
const JOBS: &[&str] = &["软件工程师", "产品经理", "会计", "销售经理", "人力资源专员", "数据分析师", "律师"];

/// Headers with a fixed set of values.
const CHOICES: &[(&str, &[&str])] = &[
    ("性别", &["男", "女"]),
    ("民族", &["汉族", "蒙古族", "回族", "藏族", "维吾尔族", "苗族", "彝族", "壮族", "布依族", "朝鲜族", "满族"]),
    ("国籍", &["中国"]),
    ("家庭关系", &["本人", "配偶", "子女", "父母", "兄弟姐妹"]),
    ("学历", &["博士研究生", "硕士研究生", "本科", "大专", "高中", "中专"]),
    ("学位", &["学士", "硕士", "博士", "无"]),
    ("证件类型", DOC_TYPES),
    ("病症", DISEASES),
    ("以往病史", DISEASES),
    ("诊断", DISEASES),
    ("药物食物过敏信息", &["无", "青霉素", "头孢菌素", "磺胺类药物", "海鲜", "花粉", "芒果", "花生"]),
    ("家族病史", &["高血压", "糖尿病", "无"]),
    ("生育信息", &["已育", "未育"]),
    ("交易类型", &["存款", "取款", "转账", "消费", "还款", "理财申购", "工资发放"]),
    ("通信类型", &["语音通话", "短信", "彩信", "电子邮件"]),
    ("分组", &["家人", "同事", "朋友", "未分组"]),
    ("操作类型", &["浏览商品", "提交订单", "入库", "出库", "盘点"]),
    ("用户行为日志", ECOMMERCE_ACTIONS),
    ("风险评级", &["低", "中", "高"]),
    ("反洗钱(AML)标记", BOOLEANS),
    ("委托类型", &["限价买入", "限价卖出", "市价买入", "市价卖出"]),
    ("险种", &["健康险", "意外险", "寿险", "车险"]),
    ("理赔状态", &["未出险", "理赔中", "已赔付", "已拒赔"]),
    ("健康告知", &["无异常", "有住院史"]),
    ("支付方式", &["微信支付", "支付宝", "银行卡"]),
    ("状态", &["正常", "故障", "维修中", "支付成功"]),
    ("融资轮次", &["天使轮", "A轮", "B轮", "C轮", "Pre-IPO"]),
    ("所属行业", INDUSTRIES),
    ("客户行业", INDUSTRIES),
    ("经营范围", &["软件开发", "技术咨询", "货物进出口", "餐饮服务", "物业管理"]),
    ("职位", JOBS),
    ("应聘职位", JOBS),
    ("案件类型", &["刑事案件", "民事纠纷", "交通违法"]),
    ("处理状态", &["立案", "侦查中", "已结案"]),
    ("出入境记录", YES_NO),
    ("行政处罚记录", &["无", "罚款1万元", "罚款5万元", "责令整改"]),
    ("税率", &["0.03", "0.06", "0.09", "0.13"]),
    ("业务类型", &["婚姻登记", "社会救助申请", "养老金发放"]),
    ("医保缴纳记录", &["连续缴纳", "中断缴纳"]),
    ("传染病名称", &["流行性感冒", "水痘", "肺结核", "手足口病"]),
    ("疫苗接种记录", &["甲肝疫苗", "乙肝疫苗", "新冠疫苗", "流感疫苗"]),
    ("课程名称", &["高等数学", "大学物理", "线性代数", "概率论", "大学英语"]),
    ("天气", &["晴", "多云", "雨", "雪"]),
    ("天气预测", &["晴", "多云", "雨"]),
    ("设施类型", &["智能路灯", "井盖", "公共停车场"]),
    ("事件类型", &["安全生产事故", "自然灾害", "公共卫生事件"]),
    ("灾害评估", &["轻微", "中等", "严重"]),
    ("指标名称", &["国内生产总值(GDP)", "居民消费价格指数(CPI)", "工业生产者出厂价格指数(PPI)"]),
    ("单位", &["%", "万亿元"]),
    ("封装测试数据", &["PASS", "FAIL"]),
    ("SMT产线数据", &["正常", "停线"]),
    ("设备健康监测(PHM)", &["正常", "预警"]),
    ("设备运行日志", &["运行", "停机"]),
    ("安全监控", &["瓦斯正常", "粉尘超标"]),
    ("整车质检(VQ)结果", &["合格", "返修"]),
    ("碰撞仿真数据", &["PASS", "FAIL"]),
    ("车型", &["Model X", "Model Y", "Model Z"]),
    ("维保项目", &["更换机油机滤", "四轮定位", "更换轮胎", "钣金喷漆", "清洗节气门", "更换火花塞"]),
    ("驾驶行为数据", &["正常", "急加速", "急刹车", "超速"]),
    ("车载传感器(Lidar)数据", &["正常", "遮挡", "故障"]),
    ("货物追踪", &["已揽收", "运输中", "派送中", "已签收", "异常件", "已退回"]),
    ("WMS系统日志", &["操作成功", "操作失败"]),
    ("服务类型", &["网约车", "共享单车", "共享汽车", "法律咨询", "合同审查", "诉讼代理"]),
    ("输配电线路状态", &["正常", "检修"]),
    ("油品", &["92号汽油", "95号汽油", "0号柴油"]),
    ("供水管网漏损监测", &["正常", "疑似泄漏"]),
    ("产品名称", &["可乐", "方便面", "洗发水", "矿泉水"]),
    ("渠道分销数据", &["大卖场", "便利店", "线上旗舰店"]),
    ("品牌推广活动效果", GRADES),
    ("招聘渠道效能分析", GRADES),
    ("住院记录(HIS)", &["住院中", "已出院"]),
    ("处方数据", &["阿莫西林", "布洛芬", "二甲双胍", "阿司匹林"]),
    ("设备类型", &["监护仪", "呼吸机", "MRI"]),
    ("设备使用日志", &["正常运行", "待机", "故障停机"]),
    ("植入式设备监测数据", &["信号良好", "信号弱"]),
    ("销售与维护记录", &["已售", "维护中"]),
    ("可穿戴设备", &["智能手环", "智能手表"]),
    ("体检报告", &["正常", "异常"]),
    ("营养膳食记录", &["均衡", "偏高脂", "偏高糖"]),
    ("心理咨询记录", YES_NO),
    ("中介带看记录", YES_NO),
    ("施工安全日志", &["一切正常", "发现安全隐患"]),
    ("物业费收缴记录", &["已缴清", "欠费"]),
    ("监控数据", &["正常", "离线"]),
    ("订阅数据", BOOLEANS),
    ("付费会员数据", BOOLEANS),
    ("舆情监测数据", &["正面", "中性", "负面"]),
    ("流媒体用户播放行为", &["播放", "暂停", "快进"]),
    ("游戏内行为", &["任务", "消费", "社交"]),
    ("玩家社交关系", &["添加好友", "组队", "加入公会"]),
    ("赛事票务", &["已售罄", "余票充足"]),
    ("预订渠道数据", &["官方App", "OTA平台(携程)", "OTA平台(飞猪)", "电话预定", "前台直接入住"]),
    ("外卖订单", YES_NO),
    ("作物长势监测", &["良好", "一般", "差"]),
    ("牲畜谱系", &["荷斯坦牛", "西门塔尔牛", "安格斯牛"]),
    ("健康档案", &["正常", "治疗中"]),
    ("法律文书库", &["律师函", "起诉状", "合同范本"]),
    ("企业财务审计底稿", &["已归档", "待复核"]),
    ("咨询项目交付成果", &["PPT报告", "Excel模型", "PPT报告, Excel模型"]),
    ("候选人简历库", &["已入库", "待筛选"]),
    ("精准定位信息", &["GPS", "Wi-Fi", "基站"]),
    ("尽职调查数据", &["财务、法务尽调完成", "尽调进行中"]),
    ("公共设施维修保养记录", &["电梯已保养", "路灯已维修", "水泵已检修"]),
];

/// Identity document types; the number and issuer follow the type.
pub const DOC_TYPES: &[&str] = &["身份证", "护照", "驾驶证", "工作证", "社保卡", "居住证"];

/// Headers whose values follow a digit template.
const FORMATS: &[(&str, &str)] = &[
    ("订单交易", "ORD##########"),
    ("会员消费记录", "########"),
    ("保单号", "P############"),
];

/// Headers holding plain numbers: (header, min, max, decimals).
const NUMBERS: &[(&str, f64, f64, usize)] = &[
    ("PM2.5", 10.0, 200.0, 0),
    ("水质PH值", 6.0, 8.5, 1),
    ("征信分数", 400.0, 850.0, 0),
    ("成绩", 60.0, 100.0, 0),
    ("数量", 1.0, 500.0, 0),
    ("汽车销量", 10.0, 200.0, 0),
    ("经销商库存", 20.0, 500.0, 0),
    ("客流统计", 100.0, 2000.0, 0),
    ("景点客流量", 1000.0, 20000.0, 0),
    ("菜品销量", 1.0, 30.0, 0),
    ("客户满意度调查", 1.0, 5.0, 0),
    ("客户评价", 1.0, 5.0, 0),
    ("会员积分", 100.0, 10000.0, 0),
    ("智能项圈活动数据", 1000.0, 8000.0, 0),
    ("数值", -2.0, 10.0, 2),
    ("员工满意度调研", 1.0, 5.0, 1),
    ("顾客翻台率", 1.0, 5.0, 1),
    ("学号", 100_000_000_000.0, 999_999_999_999.0, 0),
];

/// Unit suffix → (min, max, decimals) for measured quantities.
const UNITS: &[(&str, f64, f64, usize)] = &[
    ("(cm)", 150.0, 190.0, 0),
    ("(kg)", 20.0, 200.0, 1),
    ("(ml)", 2500.0, 5500.0, 0),
    ("(秒)", 5.0, 1800.0, 0),
    ("(分钟)", 5.0, 120.0, 0),
    ("(小时)", 1.0, 20.0, 1),
    ("(dB)", 30.0, 90.0, 0),
    ("(rpm)", 1000.0, 3000.0, 0),
    ("(MWh)", -50.0, 50.0, 2),
    ("(MW)", 10.0, 1000.0, 2),
    ("(kWh)", 0.1, 5.0, 3),
    ("(MPa)", 0.1, 10.0, 2),
    ("(Pa)", 1.0, 10.0, 2),
    ("(C)", 20.0, 100.0, 1),
    ("(℃)", 2.0, 200.0, 1),
    ("(km/h)", 0.0, 120.0, 0),
    ("(m³/h)", 100.0, 1000.0, 0),
    ("(m³)", 100.0, 2000.0, 2),
    ("(升)", 1000.0, 5000.0, 2),
    ("(手)", 1000.0, 1_000_000.0, 0),
    ("(吨)", 100.0, 1000.0, 0),
    ("(溶氧mg/L)", 5.0, 10.0, 1),
    ("(COD)", 10.0, 50.0, 1),
];

const PEOPLE: &[&str] = &[
    "投保人", "被保人", "受益人", "当事人", "发件人", "收件人", "账户持有人", "购房者数据",
];

// ── Header classification ──

/// Decide what a header holds.
pub fn kind_of(header: &str) -> Kind {
    let h = header.trim();
    if let Some((_, values)) = CHOICES.iter().find(|(name, _)| *name == h) {
        return Kind::Choice(values);
    }
    if let Some(&(_, min, max, decimals)) = NUMBERS.iter().find(|(name, ..)| *name == h) {
        return Kind::Number { min, max, decimals };
    }
    if let Some(&(_, format)) = FORMATS.iter().find(|(name, _)| *name == h) {
        return Kind::Format(format);
    }
    match h {
        "住宿信息" => return Kind::Hotel,
        "教育经历" => return Kind::Education,
        _ => {}
    }

    let has = |k: &str| h.contains(k);

    if has("姓名") || PEOPLE.contains(&h) {
        Kind::PersonName
    } else if has("电话") || has("主叫号码") || has("被叫号码") {
        Kind::Phone
    } else if has("证件号码") || has("身份证") {
        Kind::IdNumber
    } else if has("邮件") {
        Kind::Email
    } else if has("MAC") {
        Kind::Mac
    } else if has("IMEI") {
        Kind::Imei
    } else if has("IMSI") {
        Kind::Imsi
    } else if has("Android_ID") {
        Kind::AndroidId
    } else if has("IDFA") {
        Kind::Uuid
    } else if has("URL") || has("收藏列表") {
        Kind::Url
    } else if has("经度") {
        Kind::Longitude
    } else if has("纬度") {
        Kind::Latitude
    } else if has("VIN") {
        Kind::Vin
    } else if has("股票代码") {
        Kind::StockCode
    } else if has("统一社会信用代码") || has("纳税人识别号") {
        Kind::CreditCode
    } else if has("条码") {
        Kind::Ean13
    } else if has("车辆管理") {
        Kind::LicensePlate
    } else if has("银行账户") || has("对方账户") {
        Kind::BankAccount
    } else if has("有效期限") {
        Kind::Validity
    } else if has("统计周期") {
        Kind::Quarter
    } else if has("时间戳") {
        Kind::Timestamp
    } else if has("生日") {
        Kind::Birthday
    } else if has("日期") || has("起租日") {
        Kind::Date
    } else if has("时间") || has("登录信息") || has("门禁数据") {
        Kind::DateTime
    } else if has("(%)") || h.ends_with("率") {
        Kind::Percent
    } else if has("(万元)") || has("(万美元)") {
        Kind::Money {
            min: 10.0,
            max: 5000.0,
        }
    } else if has("金额") || has("价格") || has("房价") || has("费") || has("(元)") || has("索赔")
        || has("开盘价") || has("收盘价")
    {
        Kind::Money {
            min: 1.0,
            max: 100_000.0,
        }
    } else if let Some(&(_, min, max, decimals)) = UNITS.iter().find(|(unit, ..)| has(unit)) {
        Kind::Number { min, max, decimals }
    } else if has("签发机关") {
        Kind::Issuer
    } else if has("单位") || has("企业名称") || has("公司") || has("商户名称") || has("客户名称") {
        Kind::Company
    } else if has("住址") || has("地址") || has("位置") || has("户籍") || has("房产信息") || has("行踪轨迹")
    {
        Kind::Address
    } else if has("来源地") {
        Kind::Province
    } else if has("始发站") || has("终点站") || has("目的地") {
        Kind::City
    } else if h.ends_with("ID") || has("流水号") || has("订单号") {
        Kind::Uuid
    } else if has("号") || has("编号") || has("代码") || has("SKU") || has("POS") || has("流水") || has("批次")
    {
        Kind::Code
    } else {
        Kind::Text
    }
}

// ── Value generation ──

fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items[rng.random_range(0..items.len())]
}

fn digits<R: Rng + ?Sized>(rng: &mut R, n: usize) -> String {
    (0..n)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

fn chars_from<R: Rng + ?Sized>(rng: &mut R, alphabet: &[u8], n: usize) -> String {
    (0..n)
        .map(|_| char::from(alphabet[rng.random_range(0..alphabet.len())]))
        .collect()
}

fn ascii_prefix(header: &str) -> String {
    let prefix: String = header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase();
    if prefix.is_empty() {
        "NO".to_string()
    } else {
        prefix
    }
}

fn company<R: Rng + ?Sized>(rng: &mut R) -> String {
    CompanyName(ZH_CN).fake_with_rng(rng)
}

fn city<R: Rng + ?Sized>(rng: &mut R) -> String {
    CityName(ZH_CN).fake_with_rng(rng)
}

fn province<R: Rng + ?Sized>(rng: &mut R) -> String {
    StateName(ZH_CN).fake_with_rng(rng)
}

/// A moment between `from` and `to`.
fn between<R: Rng + ?Sized>(rng: &mut R, from: NaiveDateTime, to: NaiveDateTime) -> NaiveDateTime {
    let at: DateTime<Utc> = DateTimeBetween(ZH_CN, from.and_utc(), to.and_utc()).fake_with_rng(rng);
    at.naive_utc()
}

fn years(n: i64) -> Duration {
    Duration::days(365 * n)
}

/// 18-digit resident identity number with a valid check character.
fn id_number<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime) -> String {
    let birth = between(rng, now - years(80), now - years(18));
    let body = format!(
        "{}{}{}",
        pick(rng, ID_REGIONS),
        birth.format("%Y%m%d"),
        digits(rng, 3)
    );
    let mut id = body.clone();
    id.push(id_check_char(&body));
    id
}

pub(crate) fn id_check_char(body: &str) -> char {
    const WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];
    const CHECK: &[u8; 11] = b"10X98765432";
    let sum: u32 = body
        .chars()
        .filter_map(|c| c.to_digit(10))
        .zip(WEIGHTS)
        .map(|(d, w)| d * w)
        .sum();
    char::from(CHECK[(sum % 11) as usize])
}

/// Append the Luhn check digit to a digit string.
pub(crate) fn with_luhn(body: &str) -> String {
    let sum: u32 = body
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 0 {
                let x = d * 2;
                if x > 9 { x - 9 } else { x }
            } else {
                d
            }
        })
        .sum();
    format!("{body}{}", (10 - sum % 10) % 10)
}

/// Number and issuing authority of an identity document of `doc_type`.
pub fn identity_document<R: Rng + ?Sized>(
    doc_type: &str,
    rng: &mut R,
    now: NaiveDateTime,
) -> (String, String) {
    match doc_type {
        "身份证" => {
            let issuer = format!("{}{}公安局", province(rng), city(rng));
            (id_number(rng, now), issuer)
        }
        "护照" => (
            NumberWithFormat(ZH_CN, "E########").fake_with_rng(rng),
            "国家移民管理局".to_string(),
        ),
        _ => (
            chars_from(rng, b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ", 18),
            format!("{}印发", company(rng)),
        ),
    }
}

fn uuid<R: Rng + ?Sized>(rng: &mut R) -> String {
    let id: uuid::Uuid = UUIDv4.fake_with_rng(rng);
    id.to_string()
}

fn url<R: Rng + ?Sized>(rng: &mut R) -> String {
    let host: String = Word(EN).fake_with_rng(rng);
    let suffix: String = DomainSuffix(ZH_CN).fake_with_rng(rng);
    let path: String = Word(EN).fake_with_rng(rng);
    format!("https://www.{host}.{suffix}/{path}/{}", rng.random_range(1..100_000))
}

/// One value of `kind`. `header` feeds prefixes for code-like columns;
/// `now` anchors every date so a seeded run is reproducible.
pub fn value<R: Rng + ?Sized>(kind: Kind, header: &str, rng: &mut R, now: NaiveDateTime) -> String {
    match kind {
        Kind::Choice(values) => pick(rng, values).to_string(),
        Kind::Number { min, max, decimals } => {
            format!("{:.*}", decimals, rng.random_range(min..=max))
        }
        Kind::Money { min, max } => format!("{:.2}", rng.random_range(min..=max)),
        Kind::Percent => format!("{:.2}", rng.random_range(0.0..=100.0)),
        Kind::PersonName => Name(ZH_CN).fake_with_rng(rng),
        Kind::Phone => CellNumber(ZH_CN).fake_with_rng(rng),
        Kind::IdNumber => id_number(rng, now),
        Kind::Email => FreeEmail(ZH_CN).fake_with_rng(rng),
        Kind::Mac => MACAddress(ZH_CN).fake_with_rng(rng),
        Kind::Imei => with_luhn(&digits(rng, 14)),
        Kind::Imsi => NumberWithFormat(ZH_CN, "4600###########").fake_with_rng(rng),
        Kind::AndroidId => chars_from(rng, b"0123456789abcdef", 16),
        Kind::Uuid => uuid(rng),
        Kind::Url => url(rng),
        Kind::Longitude => format!("{:.6}", rng.random_range(73.5..=135.0)),
        Kind::Latitude => format!("{:.6}", rng.random_range(18.0..=53.5)),
        Kind::Vin => chars_from(rng, b"0123456789ABCDEFGHJKLMNPRSTUVWXYZ", 17),
        Kind::StockCode => format!(
            "{:06}.{}",
            rng.random_range(0..600_000),
            pick(rng, &["SH", "SZ"])
        ),
        Kind::CreditCode => chars_from(rng, b"0123456789ABCDEFGHJKLMNPQRTUWXY", 18),
        Kind::Ean13 => with_ean_check(&format!("69{}", digits(rng, 10))),
        Kind::LicensePlate => format!(
            "{}{}{}",
            pick(rng, PLATE_PROVINCES),
            chars_from(rng, b"ABCDEFGH", 1),
            chars_from(rng, b"0123456789ABCDEFGHJKLMNPQRSTUVWXYZ", 5)
        ),
        Kind::BankAccount => NumberWithFormat(ZH_CN, "62#################").fake_with_rng(rng),
        Kind::Date => between(rng, now - years(10), now)
            .format("%Y-%m-%d")
            .to_string(),
        Kind::Birthday => between(rng, now - years(80), now - years(18))
            .format("%Y-%m-%d")
            .to_string(),
        Kind::DateTime => between(rng, now - years(1), now)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Kind::Timestamp => between(rng, now - years(1), now)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string(),
        Kind::Validity => {
            let issued = between(rng, now - years(10), now);
            let expires = issued + years(rng.random_range(5..=20));
            format!("{}-{}", issued.format("%Y.%m.%d"), expires.format("%Y.%m.%d"))
        }
        Kind::Quarter => format!(
            "{}Q{}",
            now.year() - rng.random_range(0..10),
            rng.random_range(1..=4)
        ),
        Kind::Company => company(rng),
        Kind::Issuer => {
            let doc_type = pick(rng, DOC_TYPES);
            identity_document(doc_type, rng, now).1
        }
        Kind::Hotel => format!("{}酒店", company(rng)),
        Kind::Education => {
            let start = between(rng, now - years(40), now - years(22)).year();
            format!("{start}-{} {}大学", start + 4, city(rng))
        }
        Kind::Format(format) => NumberWithFormat(ZH_CN, format).fake_with_rng(rng),
        Kind::Address => format!(
            "{}{}{}{}号",
            province(rng),
            city(rng),
            StreetName(ZH_CN).fake_with_rng::<String, _>(rng),
            rng.random_range(1..=200)
        ),
        Kind::City => city(rng),
        Kind::Province => province(rng),
        Kind::Code => format!("{}{}", ascii_prefix(header), digits(rng, 10)),
        Kind::Text => Sentence(ZH_CN, 3..8).fake_with_rng(rng),
    }
}

/// EAN-13: append the check digit (weights 1, 3 from the left).
fn with_ean_check(body: &str) -> String {
    let sum: u32 = body
        .chars()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d } else { d * 3 })
        .sum();
    format!("{body}{}", (10 - sum % 10) % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CATEGORIES;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 7)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    #[test]
    fn headers_map_to_expected_kinds() {
        assert_eq!(kind_of("姓名"), Kind::PersonName);
        assert_eq!(kind_of("患者姓名"), Kind::PersonName);
        assert_eq!(kind_of("个人电话号码"), Kind::Phone);
        assert_eq!(kind_of("证件号码"), Kind::IdNumber);
        assert_eq!(kind_of("电子邮件地址"), Kind::Email);
        assert_eq!(kind_of("设备MAC地址"), Kind::Mac);
        assert_eq!(kind_of("通话开始时间"), Kind::DateTime);
        assert_eq!(kind_of("成立日期"), Kind::Date);
        assert_eq!(kind_of("时间戳"), Kind::Timestamp);
        assert_eq!(kind_of("入住率(%)"), Kind::Percent);
        assert_eq!(kind_of("通话时长(秒)"), Kind::Number { min: 5.0, max: 1800.0, decimals: 0 });
        assert!(matches!(kind_of("交易金额"), Kind::Money { .. }));
        assert!(matches!(kind_of("性别"), Kind::Choice(_)));
        assert_eq!(kind_of("用户ID"), Kind::Uuid);
        assert_eq!(kind_of("电子病历号(EMR)"), Kind::Code);
        assert_eq!(kind_of("工作单位"), Kind::Company);
        assert_eq!(kind_of("车辆识别代号(VIN)"), Kind::Vin);
    }

    #[test]
    fn every_schema_header_produces_a_value() {
        let mut rng = StdRng::seed_from_u64(7);
        for c in CATEGORIES {
            for h in c.core.iter().chain(c.optional) {
                let v = value(kind_of(h), h, &mut rng, now());
                assert!(!v.is_empty(), "{}: empty value for {h}", c.key);
            }
        }
    }

    #[test]
    fn identity_numbers_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let id = value(Kind::IdNumber, "证件号码", &mut rng, now());
            assert_eq!(id.len(), 18);
            assert_eq!(id.chars().last(), Some(id_check_char(&id[..17])));
        }
        // Published sample number.
        assert_eq!(id_check_char("11010519491231002"), 'X');
    }

    #[test]
    fn luhn_and_ean_check_digits() {
        assert_eq!(with_luhn("7992739871"), "79927398713");
        assert_eq!(with_ean_check("400638133393"), "4006381333931");
    }

    #[test]
    fn contact_details_are_filled() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let phone = value(Kind::Phone, "电话", &mut rng, now());
            assert!(phone.chars().filter(char::is_ascii_digit).count() >= 7, "{phone}");
            let email = value(Kind::Email, "电子邮件", &mut rng, now());
            assert!(email.contains('@'), "{email}");
            let mac = value(Kind::Mac, "设备MAC地址", &mut rng, now());
            assert_eq!(mac.split(':').count(), 6, "{mac}");
            assert!(!value(Kind::PersonName, "姓名", &mut rng, now()).trim().is_empty());
        }
    }

    #[test]
    fn digit_templates() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(kind_of("订单交易"), Kind::Format("ORD##########"));
        let order = value(kind_of("订单交易"), "订单交易", &mut rng, now());
        assert_eq!(order.len(), 13);
        assert!(order.starts_with("ORD"));
        assert!(order[3..].chars().all(|c| c.is_ascii_digit()));

        let account = value(Kind::BankAccount, "银行账户", &mut rng, now());
        assert_eq!(account.len(), 19);
        assert!(account.starts_with("62"));
        let imsi = value(Kind::Imsi, "SIM卡IMSI", &mut rng, now());
        assert_eq!(imsi.len(), 15);
        assert!(imsi.starts_with("4600"));
    }

    #[test]
    fn identity_documents_follow_their_type() {
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..20 {
            let (number, issuer) = identity_document("护照", &mut rng, now());
            assert_eq!(number.len(), 9);
            assert!(number.starts_with('E'));
            assert!(number[1..].chars().all(|c| c.is_ascii_digit()));
            assert_eq!(issuer, "国家移民管理局");

            let (number, issuer) = identity_document("身份证", &mut rng, now());
            assert_eq!(number.len(), 18);
            assert_eq!(number.chars().last(), Some(id_check_char(&number[..17])));
            assert!(issuer.ends_with("公安局"), "{issuer}");

            let (number, issuer) = identity_document("社保卡", &mut rng, now());
            assert_eq!(number.len(), 18);
            assert!(number.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
            assert!(issuer.ends_with("印发"), "{issuer}");
        }
    }

    #[test]
    fn education_spans_four_years() {
        let mut rng = StdRng::seed_from_u64(8);
        let v = value(kind_of("教育经历"), "教育经历", &mut rng, now());
        let (span, school) = v.split_once(' ').unwrap();
        let (start, end) = span.split_once('-').unwrap();
        let (start, end): (i32, i32) = (start.parse().unwrap(), end.parse().unwrap());
        assert_eq!(end - start, 4);
        assert!((1985..=2003).contains(&start), "{start}");
        assert!(school.ends_with("大学"));
        assert!(value(kind_of("住宿信息"), "住宿信息", &mut rng, now()).ends_with("酒店"));
    }

    #[test]
    fn numbers_respect_range_and_precision() {
        let mut rng = StdRng::seed_from_u64(5);
        let kind = Kind::Number { min: 6.0, max: 8.5, decimals: 1 };
        for _ in 0..50 {
            let v = value(kind, "水质PH值", &mut rng, now());
            let x: f64 = v.parse().unwrap();
            assert!((6.0..=8.5).contains(&x));
            assert_eq!(v.split('.').nth(1).map(str::len), Some(1));
        }
    }

    #[test]
    fn dates_anchor_on_now() {
        let mut rng = StdRng::seed_from_u64(9);
        let d = value(Kind::DateTime, "交易时间", &mut rng, now());
        let parsed = NaiveDateTime::parse_from_str(&d, "%Y-%m-%d %H:%M:%S").unwrap();
        assert!(parsed <= now());
        assert!(now() - parsed <= Duration::days(366));
    }

    #[test]
    fn same_seed_same_values() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for h in ["姓名", "用户ID", "交易时间", "设备MAC地址"] {
            assert_eq!(
                value(kind_of(h), h, &mut a, now()),
                value(kind_of(h), h, &mut b, now())
            );
        }
    }
}
