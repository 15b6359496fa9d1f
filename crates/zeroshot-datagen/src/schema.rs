//! The 65 data categories and their column schemas.
//!
//! Every file of a category carries all core columns plus a random non-empty
//! subset of the optional ones.

/// Column layout of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySchema {
    /// Stable identifier, `NN_snake_case`.
    pub key: &'static str,
    /// Display name; also the CSV modality label of the category.
    pub name: &'static str,
    pub core: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl CategorySchema {
    /// Number prefix of the key (`1` for `01_personal_basic_info`).
    pub fn number(&self) -> u32 {
        self.key
            .split('_')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }

    /// Whether `query` names this category: key, display name or number.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.key == query
            || self.name == query
            || query.parse::<u32>().is_ok_and(|n| n == self.number())
    }
}

macro_rules! schema {
    ($key:literal, $name:literal, $core:expr, $optional:expr) => {
        CategorySchema {
            key: $key,
            name: $name,
            core: $core,
            optional: $optional,
        }
    };
}

pub const CATEGORIES: &[CategorySchema] = &[
    schema!(
        "01_personal_basic_info",
        "个人基本资料",
        &["姓名", "性别"],
        &["生日", "民族", "国籍", "家庭关系", "住址", "个人电话号码", "电子邮件地址"]
    ),
    schema!(
        "02_personal_identity",
        "个人身份信息",
        &["姓名", "证件类型", "证件号码"],
        &["签发机关", "有效期限"]
    ),
    schema!(
        "03_personal_health",
        "个人健康生理信息",
        &["记录ID", "姓名", "病症"],
        &["以往病史", "药物食物过敏信息", "身高(cm)", "体重(kg)", "肺活量(ml)", "家族病史", "生育信息"]
    ),
    schema!(
        "04_personal_education_work",
        "个人教育工作信息",
        &["姓名", "工作单位", "职位"],
        &["学历", "学位", "教育经历", "工作经历", "培训记录", "成绩单"]
    ),
    schema!(
        "05_personal_property",
        "个人财产信息",
        &["账户持有人", "银行账户", "交易流水号"],
        &["交易类型", "交易金额", "交易时间", "房产信息", "征信分数", "虚拟货币"]
    ),
    schema!(
        "06_personal_communication",
        "个人通信信息",
        &["主叫号码", "被叫号码", "通信类型"],
        &["通话开始时间", "通话时长(秒)", "短信内容"]
    ),
    schema!(
        "07_contacts_info",
        "联系人信息",
        &["姓名", "电话"],
        &["电子邮件", "分组", "备注", "好友列表", "群列表"]
    ),
    schema!(
        "08_online_records",
        "个人上网记录",
        &["用户ID", "访问URL"],
        &["访问时间", "操作类型", "停留时长(秒)", "收藏列表", "软件使用记录"]
    ),
    schema!(
        "09_device_info",
        "个人常用设备信息",
        &["设备MAC地址"],
        &["硬件序列号", "软件列表", "IMEI", "Android_ID", "IDFA", "SIM卡IMSI"]
    ),
    schema!(
        "10_location_info",
        "个人位置信息",
        &["用户ID", "经度", "纬度", "时间戳"],
        &["行踪轨迹描述", "精准定位信息", "住宿信息"]
    ),
    schema!(
        "11_banking",
        "银行业",
        &["客户ID", "账户流水号", "交易类型", "金额", "交易时间"],
        &["风险评级", "反洗钱(AML)标记", "对方账户", "摘要"]
    ),
    schema!(
        "12_securities",
        "证券业",
        &["股票代码", "时间", "收盘价"],
        &["开盘价", "成交量(手)", "投资者ID", "委托类型", "上市公司财报"]
    ),
    schema!(
        "13_insurance",
        "保险业",
        &["保单号", "投保人", "被保人", "险种"],
        &["保费(元)", "保险金额(元)", "理赔状态", "健康告知"]
    ),
    schema!(
        "14_fintech",
        "金融科技",
        &["支付流水号", "用户ID", "金额"],
        &["商户名称", "支付方式", "状态", "时间", "P2P借贷记录"]
    ),
    schema!(
        "15_trust_leasing",
        "信托与租赁",
        &["合同编号", "产品名称", "合同金额"],
        &["受益人", "租赁物信息", "起租日"]
    ),
    schema!(
        "16_vc_pe",
        "风险投资与私募股权",
        &["项目公司", "融资轮次", "投资金额(万美元)"],
        &["投后估值(万美元)", "投资日期", "所属行业", "尽职调查数据"]
    ),
    schema!(
        "17_public_security_justice",
        "公安司法",
        &["案件编号", "案件类型", "当事人"],
        &["报案时间", "处理状态", "人口户籍", "车辆管理", "出入境记录"]
    ),
    schema!(
        "18_market_regulation",
        "市场监管",
        &["统一社会信用代码", "企业名称"],
        &["注册资本(万元)", "成立日期", "经营范围", "行政处罚记录", "知识产权"]
    ),
    schema!(
        "19_taxation_finance",
        "税务财政",
        &["纳税人识别号", "发票号码", "含税金额"],
        &["发票代码", "开票日期", "税率", "财政收支"]
    ),
    schema!(
        "20_civil_social_security",
        "民政社保",
        &["业务类型", "当事人", "发生日期"],
        &["登记证号", "金额(元)", "医保缴纳记录"]
    ),
    schema!(
        "21_public_health",
        "卫生健康",
        &["上报卡号", "传染病名称", "发病日期"],
        &["上报单位", "疫苗接种记录", "医保基金运行数据"]
    ),
    schema!(
        "22_education_research",
        "教育科研",
        &["学号", "姓名", "课程名称", "成绩"],
        &["科研项目名称", "项目经费(万元)", "学术论文"]
    ),
    schema!(
        "23_natural_resources_env",
        "自然资源与环保",
        &["监测点ID", "时间"],
        &["PM2.5", "噪音(dB)", "水质PH值", "天气", "污染源排放"]
    ),
    schema!(
        "24_urban_management",
        "城市管理",
        &["设施ID", "设施类型", "状态"],
        &["上报时间", "位置", "人流密度监测"]
    ),
    schema!(
        "25_emergency_management",
        "应急管理",
        &["事件编号", "事件类型", "发生时间"],
        &["报告单位", "应急物资储备", "灾害评估"]
    ),
    schema!(
        "26_national_statistics",
        "国家统计",
        &["统计周期", "指标名称", "数值"],
        &["单位", "人口普查数据"]
    ),
    schema!(
        "27_electronics_semiconductor",
        "电子与半导体",
        &["批次号", "产品型号"],
        &["晶圆制造良率(%)", "封装测试数据", "SMT产线数据", "电子元器件BOM表"]
    ),
    schema!(
        "28_heavy_industry_equipment",
        "重工与装备制造",
        &["设备ID", "时间戳"],
        &["温度(C)", "压力(Pa)", "转速(rpm)", "设备健康监测(PHM)", "供应链订单"]
    ),
    schema!(
        "29_chemical_new_materials",
        "化工与新材料",
        &["反应釜编号", "生产批号"],
        &["生产配方ID", "温度(℃)", "压力(MPa)", "危化品仓储"]
    ),
    schema!(
        "30_raw_materials_mining",
        "原材料与采矿",
        &["矿区编号", "矿石品位(%)"],
        &["勘探数据", "设备运行日志", "安全监控", "大宗商品价格"]
    ),
    schema!(
        "31_vehicle_randd_manufacturing",
        "整车研发与制造",
        &["车辆识别代号(VIN)", "下线时间"],
        &["零部件清单", "生产线节拍(秒)", "整车质检(VQ)结果", "碰撞仿真数据"]
    ),
    schema!(
        "32_sales_distribution",
        "销售与分销",
        &["经销商代码", "车型", "汽车销量"],
        &["销售日期", "消费者画像", "经销商库存"]
    ),
    schema!(
        "33_after_sales_service",
        "汽车售后市场",
        &["工单号", "车辆识别代号(VIN)", "维保项目"],
        &["零配件更换数据", "索赔数据", "客户满意度调查"]
    ),
    schema!(
        "34_connected_vehicles",
        "车联网与智能驾驶",
        &["车辆识别代号(VIN)", "时间戳", "经度", "纬度"],
        &["速度(km/h)", "驾驶行为数据", "车载传感器(Lidar)数据"]
    ),
    schema!(
        "35_passenger_transport",
        "客运服务",
        &["票号", "班次", "始发站", "终点站"],
        &["出发时间", "旅客姓名", "正点率"]
    ),
    schema!(
        "36_freight_logistics",
        "货运与物流",
        &["运单号", "货物追踪"],
        &["发件人", "收件人", "车辆载货率(%)", "冷链温度监控(℃)"]
    ),
    schema!(
        "37_warehousing",
        "仓储服务",
        &["SKU", "操作类型", "数量"],
        &["商品名称", "库位管理", "WMS系统日志"]
    ),
    schema!(
        "38_mobility_services",
        "出行服务",
        &["订单号", "服务类型", "用户ID"],
        &["开始时间", "行程费用(元)", "行程时长(分钟)"]
    ),
    schema!(
        "39_electricity_power",
        "电力行业",
        &["智能电表号(AMI)", "时间点", "用电量(kWh)"],
        &["电网负荷(MW)", "发电厂出力数据(MW)", "输配电线路状态"]
    ),
    schema!(
        "40_oil_gas",
        "石油天然气",
        &["油井ID", "管道压力(MPa)", "管道流量(m³/h)"],
        &["加油站ID", "油品", "销量(升)"]
    ),
    schema!(
        "41_water_utilities",
        "水务行业",
        &["智能水表号", "读数(m³)"],
        &["时间", "供水管网漏损监测", "污水处理水质(COD)"]
    ),
    schema!(
        "42_renewable_energy",
        "新能源",
        &["电场ID", "时间戳", "发电功率(MW)"],
        &["天气预测", "储能设备充放电数据(MWh)", "碳交易数据(吨)"]
    ),
    schema!(
        "43_ecommerce",
        "线上电商",
        &["用户ID", "用户行为日志"],
        &["商品ID", "订单交易", "访问时间", "用户评价", "购物车数据"]
    ),
    schema!(
        "44_offline_retail",
        "线下商超",
        &["POS机销售流水", "门店ID", "商品条码"],
        &["数量", "会员消费记录", "客流统计"]
    ),
    schema!(
        "45_cpg",
        "快速消费品",
        &["产品名称", "渠道分销数据"],
        &["市场份额(%)", "品牌推广活动效果", "消费者调研问卷ID"]
    ),
    schema!(
        "46_medical_institutions",
        "医疗机构",
        &["电子病历号(EMR)", "患者姓名", "诊断"],
        &["检验(LIS)结果", "医学影像(CT)号", "住院记录(HIS)", "处方数据"]
    ),
    schema!(
        "47_life_sciences_pharma",
        "生命科学与制药",
        &["临床试验编号", "药物研发数据"],
        &["基因测序数据ID", "药品流通数据", "不良反应报告ID"]
    ),
    schema!(
        "48_medical_devices",
        "医疗器械",
        &["设备序列号", "设备类型"],
        &["设备使用日志", "性能参数", "植入式设备监测数据", "销售与维护记录"]
    ),
    schema!(
        "49_health_management",
        "健康管理",
        &["用户ID", "可穿戴设备", "体征数据"],
        &["体检报告", "营养膳食记录", "心理咨询记录"]
    ),
    schema!(
        "50_real_estate",
        "地产开发与销售",
        &["楼盘名称", "房产交易价格(万元)"],
        &["户型图", "购房者数据", "中介带看记录", "地块信息"]
    ),
    schema!(
        "51_construction_engineering",
        "建筑工程",
        &["项目编号", "工程项目进度(%)"],
        &["建筑信息模型(BIM)数据ID", "建材采购与消耗", "施工安全日志"]
    ),
    schema!(
        "52_property_management",
        "物业管理",
        &["住户信息", "物业费收缴记录"],
        &["门禁数据", "监控数据", "公共设施维修保养记录"]
    ),
    schema!(
        "53_news_publishing",
        "新闻出版",
        &["文章ID", "文章点击率(%)"],
        &["读者画像", "订阅数据", "舆情监测数据"]
    ),
    schema!(
        "54_media_streaming",
        "广播影视与流媒体",
        &["用户ID", "影片名称"],
        &["收视率(%)", "票房数据(万元)", "流媒体用户播放行为", "付费会员数据"]
    ),
    schema!(
        "55_gaming",
        "游戏产业",
        &["玩家ID", "登录信息"],
        &["游戏内行为", "虚拟道具交易", "玩家社交关系"]
    ),
    schema!(
        "56_sports",
        "体育产业",
        &["运动员ID", "赛场表现数据"],
        &["生理数据", "赛事票务", "体育用品销售(元)", "博彩赔率数据"]
    ),
    schema!(
        "57_hotel_accommodation",
        "酒店住宿",
        &["订单号", "平均房价(ADR)"],
        &["预订渠道数据", "入住率(%)", "客户评价", "会员积分"]
    ),
    schema!(
        "58_catering",
        "餐饮行业",
        &["订单号", "菜品销量"],
        &["外卖订单", "顾客翻台率", "食材采购", "库存"]
    ),
    schema!(
        "59_tourism",
        "旅游服务",
        &["OTA订单号", "线路产品数据"],
        &["景点客流量", "游客来源地", "游客目的地", "消费金额(元)"]
    ),
    schema!(
        "60_farming",
        "种植业",
        &["地块编号", "作物长势监测"],
        &["土壤墒情(%)", "气象数据", "无人机遥感影像ID", "农产品价格(元/kg)"]
    ),
    schema!(
        "61_animal_husbandry",
        "畜牧业",
        &["牲畜ID", "健康档案", "产出量(kg)"],
        &["牲畜谱系", "智能项圈活动数据", "饲料消耗(kg)"]
    ),
    schema!(
        "62_fishery_aquaculture",
        "渔业水产养殖",
        &["渔船捕捞日志ID", "水产养殖区水质监测(溶氧mg/L)"],
        &["鱼群声呐探测", "饲料投喂数据(kg)"]
    ),
    schema!(
        "63_legal_services",
        "法律服务",
        &["案件卷宗号", "客户名称"],
        &["服务类型", "工时记录(小时)", "法律文书库"]
    ),
    schema!(
        "64_consulting_auditing",
        "咨询与审计",
        &["项目编号", "客户行业"],
        &["市场研究报告ID", "企业财务审计底稿", "咨询项目交付成果"]
    ),
    schema!(
        "65_human_resources",
        "人力资源",
        &["候选人ID", "应聘职位"],
        &["招聘渠道效能分析", "候选人简历库", "薪酬调查报告", "员工满意度调研"]
    ),
];

/// Look up a category by key, display name or number.
pub fn find(query: &str) -> Option<&'static CategorySchema> {
    CATEGORIES.iter().find(|c| c.matches(query))
}
